//! The hub actor: a single task that owns the [`Dispatcher`].
//!
//! Connection tasks never touch game state. They send [`HubCommand`]s
//! over one channel, and the hub handles them strictly in arrival order:
//! decode, dispatch, encode, fan out to each recipient's outbound channel.
//! That single consumer is what keeps every event fully applied before
//! the next one is looked at.

use std::collections::HashMap;

use gridduel_account::AccountStore;
use gridduel_protocol::{Codec, ConnectionId};
use gridduel_replay::ReplayError;
use tokio::sync::{mpsc, oneshot};

use crate::dispatcher::{Dispatcher, Outbound};
use crate::GridDuelError;

/// Channel capacity for inbound hub commands.
const HUB_CHANNEL_CAPACITY: usize = 1024;

/// Channel sender for delivering encoded frames to one connection's writer.
pub(crate) type PeerSender = mpsc::UnboundedSender<String>;

/// Commands sent to the hub through its channel.
pub(crate) enum HubCommand {
    /// A connection was accepted; frames for it go to `sender`.
    Connected {
        id: ConnectionId,
        sender: PeerSender,
    },

    /// A text frame arrived from a connection.
    Frame { id: ConnectionId, text: String },

    /// The connection closed or failed.
    Disconnected { id: ConnectionId },

    /// Flush persistent state and stop.
    Shutdown {
        reply: oneshot::Sender<Result<(), ReplayError>>,
    },
}

/// Handle to the running hub. Cheap to clone, one per connection task.
#[derive(Clone)]
pub(crate) struct HubHandle {
    sender: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    pub(crate) async fn connected(
        &self,
        id: ConnectionId,
        sender: PeerSender,
    ) -> Result<(), GridDuelError> {
        self.send(HubCommand::Connected { id, sender }).await
    }

    pub(crate) async fn frame(&self, id: ConnectionId, text: String) -> Result<(), GridDuelError> {
        self.send(HubCommand::Frame { id, text }).await
    }

    pub(crate) async fn disconnected(&self, id: ConnectionId) -> Result<(), GridDuelError> {
        self.send(HubCommand::Disconnected { id }).await
    }

    /// Asks the hub to flush and stop, and waits for it to finish.
    pub(crate) async fn shutdown(&self) -> Result<(), GridDuelError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(HubCommand::Shutdown { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| GridDuelError::HubUnavailable)??;
        Ok(())
    }

    async fn send(&self, command: HubCommand) -> Result<(), GridDuelError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| GridDuelError::HubUnavailable)
    }
}

/// Spawns the hub task and returns a handle to it.
pub(crate) fn spawn_hub<S, C>(
    dispatcher: Dispatcher<S>,
    codec: C,
) -> (HubHandle, tokio::task::JoinHandle<()>)
where
    S: AccountStore,
    C: Codec,
{
    let (sender, receiver) = mpsc::channel(HUB_CHANNEL_CAPACITY);
    let hub = Hub {
        dispatcher,
        codec,
        peers: HashMap::new(),
        receiver,
    };
    let task = tokio::spawn(hub.run());
    (HubHandle { sender }, task)
}

/// The hub's state. Runs inside a Tokio task.
struct Hub<S: AccountStore, C: Codec> {
    dispatcher: Dispatcher<S>,
    codec: C,
    peers: HashMap<ConnectionId, PeerSender>,
    receiver: mpsc::Receiver<HubCommand>,
}

impl<S: AccountStore, C: Codec> Hub<S, C> {
    async fn run(mut self) {
        tracing::info!("hub started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                HubCommand::Connected { id, sender } => {
                    self.peers.insert(id, sender);
                    tracing::debug!(%id, peers = self.peers.len(), "peer registered");
                }
                HubCommand::Frame { id, text } => self.handle_frame(id, &text),
                HubCommand::Disconnected { id } => {
                    self.peers.remove(&id);
                    self.dispatcher.disconnect(id);
                }
                HubCommand::Shutdown { reply } => {
                    let result = self.dispatcher.shutdown();
                    if let Err(e) = &result {
                        tracing::error!(error = %e, "replay index flush failed");
                    }
                    let _ = reply.send(result);
                    break;
                }
            }
        }

        self.peers.clear();
        tracing::info!("hub stopped");
    }

    fn handle_frame(&mut self, id: ConnectionId, text: &str) {
        let command = match self.codec.decode(text) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(%id, error = %e, frame = text, "dropping undecodable frame");
                return;
            }
        };
        tracing::trace!(%id, ?command, "dispatching");

        let outbound = self.dispatcher.dispatch(id, command);
        self.deliver(outbound);
    }

    fn deliver(&self, outbound: Vec<Outbound>) {
        for Outbound { to, event } in outbound {
            let Some(sender) = self.peers.get(&to) else {
                tracing::debug!(%to, ?event, "recipient not connected");
                continue;
            };
            if sender.send(self.codec.encode(&event)).is_err() {
                tracing::debug!(%to, "recipient writer closed");
            }
        }
    }
}
