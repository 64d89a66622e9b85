//! Command routing: one inbound command in, a batch of outbound events out.
//!
//! The dispatcher owns all core state (accounts, the match queue, the
//! session registry, the replay store) and is synchronous. The hub task
//! calls it once per inbound event, so no event ever observes another
//! half-applied.
//!
//! ```text
//! ClientCommand ──→ Dispatcher::dispatch ──→ Vec<Outbound>
//!                       │
//!     ┌─────────────┬───┴────────┬──────────────┐
//!  accounts      queue       registry       replays
//! ```

use gridduel_account::{AccountError, AccountService, AccountStore};
use gridduel_protocol::{ClientCommand, ConnectionId, ServerEvent, Side};
use gridduel_replay::{ReplayError, ReplayStore, Timestamp};
use gridduel_room::{
    GameSession, MatchQueue, MatchResult, Outcome, SessionRegistry, SpectatorJoin,
};

use crate::{DispatchConfig, ReplaySource};

/// One event addressed to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub to: ConnectionId,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn new(to: ConnectionId, event: ServerEvent) -> Self {
        Self { to, event }
    }
}

/// Routes commands to the account service, the queue, and sessions.
pub struct Dispatcher<S: AccountStore> {
    accounts: AccountService<S>,
    queue: MatchQueue,
    registry: SessionRegistry,
    replays: ReplayStore,
    config: DispatchConfig,
}

impl<S: AccountStore> Dispatcher<S> {
    /// Builds a dispatcher over an account store and an opened replay store.
    pub fn new(store: S, replays: ReplayStore, config: DispatchConfig) -> Self {
        Self {
            accounts: AccountService::new(store),
            queue: MatchQueue::new(),
            registry: SessionRegistry::new(),
            replays,
            config,
        }
    }

    /// Handles one command from `from` and returns everything to send, in
    /// send order.
    pub fn dispatch(&mut self, from: ConnectionId, command: ClientCommand) -> Vec<Outbound> {
        let mut out = Vec::new();
        match command {
            ClientCommand::CreateAccount { name, password } => {
                self.create_account(from, &name, &password, &mut out);
            }
            ClientCommand::Login { name, password } => {
                self.login(from, &name, &password, &mut out);
            }
            ClientCommand::JoinQueueForGameRoom => self.join_queue(from, &mut out),
            ClientCommand::JoinQueueAsObserver => self.join_as_observer(from, &mut out),
            ClientCommand::Play { x, y } => self.play(from, x, y, &mut out),
            ClientCommand::ChatSend { text } => self.chat(from, &text, &mut out),
            ClientCommand::RequestReplay => self.replay(from, &mut out),
        }
        out
    }

    /// Releases what a closed connection held.
    ///
    /// The login is always dropped. With `evict_on_disconnect` the
    /// matchmaking slot and spectator registrations are freed too.
    pub fn disconnect(&mut self, id: ConnectionId) {
        let account = self.accounts.logout(id);
        if self.config.evict_on_disconnect {
            if self.queue.remove(id) {
                tracing::debug!(%id, "removed from matchmaking");
            }
            self.registry.remove_spectator(id);
        }
        tracing::info!(%id, account = account.as_deref(), "connection released");
    }

    /// Flushes the replay index before the process exits.
    ///
    /// # Errors
    /// Returns [`ReplayError::Io`] if the index file can't be written.
    pub fn shutdown(&mut self) -> Result<(), ReplayError> {
        self.replays.flush()
    }

    pub fn accounts(&self) -> &AccountService<S> {
        &self.accounts
    }

    pub fn queue(&self) -> &MatchQueue {
        &self.queue
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn replays(&self) -> &ReplayStore {
        &self.replays
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    fn create_account(
        &mut self,
        from: ConnectionId,
        name: &str,
        password: &str,
        out: &mut Vec<Outbound>,
    ) {
        let event = match self.accounts.create_account(from, name, password) {
            Ok(()) => ServerEvent::AccountCreationComplete,
            Err(e @ AccountError::Io(_)) => {
                tracing::warn!(%from, name, error = %e, "account store write failed");
                ServerEvent::AccountCreationFailed
            }
            Err(e) => {
                tracing::info!(%from, name, reason = %e, "account creation refused");
                ServerEvent::AccountCreationFailed
            }
        };
        out.push(Outbound::new(from, event));
    }

    fn login(&mut self, from: ConnectionId, name: &str, password: &str, out: &mut Vec<Outbound>) {
        let event = match self.accounts.login(from, name, password) {
            Ok(()) => ServerEvent::LoginComplete,
            Err(e) => {
                tracing::info!(%from, name, reason = %e, "login refused");
                ServerEvent::LoginFailed
            }
        };
        out.push(Outbound::new(from, event));
    }

    // -----------------------------------------------------------------------
    // Matchmaking and spectators
    // -----------------------------------------------------------------------

    fn join_queue(&mut self, from: ConnectionId, out: &mut Vec<Outbound>) {
        let (a, b) = match self.queue.enqueue(from) {
            MatchResult::Waiting => {
                tracing::debug!(%from, "waiting for an opponent");
                return;
            }
            MatchResult::Paired { waiting, joiner } => (waiting, joiner),
        };

        let id = self
            .registry
            .create_session(a, b, &self.config.room, Timestamp::now());

        out.push(Outbound::new(
            a,
            ServerEvent::GameStart {
                me: Side::A,
                opponent: Side::B,
            },
        ));
        out.push(Outbound::new(
            b,
            ServerEvent::GameStart {
                me: Side::B,
                opponent: Side::A,
            },
        ));
        out.push(Outbound::new(a, ServerEvent::DoTurn));
        out.push(Outbound::new(b, ServerEvent::WaitForTurn));

        if let Some(session) = self.registry.get(id) {
            for &spectator in session.spectators() {
                out.push(Outbound::new(spectator, observer_start()));
            }
        }
    }

    fn join_as_observer(&mut self, from: ConnectionId, out: &mut Vec<Outbound>) {
        match self.registry.add_spectator(from) {
            SpectatorJoin::Watching { session, added: true } => {
                tracing::info!(%from, %session, "spectator attached");
                out.push(Outbound::new(from, observer_start()));
            }
            SpectatorJoin::Watching { session, added: false } => {
                tracing::debug!(%from, %session, "already watching");
            }
            SpectatorJoin::Pending => {
                tracing::info!(%from, "spectator waiting for a session");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Play
    // -----------------------------------------------------------------------

    fn play(&mut self, from: ConnectionId, x: usize, y: usize, out: &mut Vec<Outbound>) {
        let Some(session) = self.registry.lookup_mut(from) else {
            tracing::debug!(%from, "play without a session");
            return;
        };

        let mv = match session.apply_move(from, x, y, Timestamp::now()) {
            Ok(mv) => mv,
            Err(e) => {
                tracing::warn!(%from, session = %session.id(), reason = %e, "play rejected");
                return;
            }
        };

        let recipients = session.recipients();
        for &to in &recipients {
            out.push(Outbound::new(
                to,
                ServerEvent::MarkSpace {
                    x: mv.x,
                    y: mv.y,
                    side: mv.side,
                },
            ));
        }

        let opponent = session.participant(mv.side.other());
        match mv.outcome {
            Outcome::Continue => {
                out.push(Outbound::new(opponent, ServerEvent::DoTurn));
                out.push(Outbound::new(from, ServerEvent::WaitForTurn));
            }
            Outcome::Win(..) | Outcome::Draw => {
                // The replay is indexed before any result event goes out.
                let label = session.replay().meta().participants_label();
                match self.replays.save(session.replay(), &label) {
                    Ok(index) => session.set_replay_index(index),
                    Err(e) => {
                        tracing::error!(session = %session.id(), error = %e, "replay not saved");
                    }
                }

                for &to in &recipients {
                    let event = match mv.outcome {
                        Outcome::Draw => ServerEvent::Draw,
                        _ if to == opponent => ServerEvent::OtherPlayerWin,
                        _ => ServerEvent::CurrentPlayerWin,
                    };
                    out.push(Outbound::new(to, event));
                }
                tracing::info!(
                    session = %session.id(),
                    state = %session.state(),
                    moves = session.move_count(),
                    "session finished"
                );
            }
        }
    }

    // -----------------------------------------------------------------------
    // Chat and replay
    // -----------------------------------------------------------------------

    fn chat(&self, from: ConnectionId, text: &str, out: &mut Vec<Outbound>) {
        let Some(session) = self.registry.lookup(from) else {
            tracing::debug!(%from, "chat without a session dropped");
            return;
        };

        let line = format!("[{}]: {}", from.into_inner(), text);
        for to in session.recipients() {
            out.push(Outbound::new(to, ServerEvent::ChatRelay { text: line.clone() }));
        }
    }

    fn replay(&self, from: ConnectionId, out: &mut Vec<Outbound>) {
        let Some(session) = self.registry.lookup(from) else {
            tracing::debug!(%from, "replay without a session dropped");
            return;
        };

        let records = match self.config.replay_source {
            ReplaySource::OwnSession => self.own_session_records(session),
            ReplaySource::LastSaved => self.last_saved_records(),
        };

        out.push(Outbound::new(from, ServerEvent::ReplayTransferStart));
        for record in records {
            out.push(Outbound::new(from, ServerEvent::ReplayTransferData { record }));
        }
        out.push(Outbound::new(from, ServerEvent::ReplayTransferEnd));
    }

    fn own_session_records(&self, session: &GameSession) -> Vec<String> {
        if let Some(index) = session.replay_index() {
            match self.replays.load_records(index) {
                Ok(records) => return records,
                Err(e) => {
                    tracing::warn!(index, error = %e, "saved replay unreadable, using live log");
                }
            }
        }
        session.replay().serialize()
    }

    fn last_saved_records(&self) -> Vec<String> {
        let Some(index) = self.replays.last_used() else {
            return Vec::new();
        };
        self.replays.load_records(index).unwrap_or_else(|e| {
            tracing::warn!(index, error = %e, "last saved replay unreadable");
            Vec::new()
        })
    }
}

fn observer_start() -> ServerEvent {
    ServerEvent::GameStartForObserver {
        first: Side::A,
        second: Side::B,
    }
}
