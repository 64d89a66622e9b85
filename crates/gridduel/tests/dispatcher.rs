//! Scenario tests for the dispatcher, driven without any networking.

use gridduel::prelude::*;

// =========================================================================
// Helpers
// =========================================================================

struct Harness {
    dispatcher: Dispatcher<MemoryAccountStore>,
    _dir: tempfile::TempDir,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(DispatchConfig::default())
    }

    fn with_config(config: DispatchConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let replays = ReplayStore::open(dir.path()).unwrap();
        Self {
            dispatcher: Dispatcher::new(MemoryAccountStore::new(), replays, config),
            _dir: dir,
        }
    }

    fn send(&mut self, from: u64, command: ClientCommand) -> Vec<Outbound> {
        self.dispatcher.dispatch(id(from), command)
    }

    fn play(&mut self, from: u64, x: usize, y: usize) -> Vec<Outbound> {
        self.send(from, ClientCommand::Play { x, y })
    }

    /// Queues 1 then 2, forming a session with 1 as side A.
    fn pair(&mut self) {
        assert!(self.send(1, ClientCommand::JoinQueueForGameRoom).is_empty());
        let out = self.send(2, ClientCommand::JoinQueueForGameRoom);
        assert!(!out.is_empty());
    }

    /// Plays the column-0 win for side A.
    fn play_column_win(&mut self) -> Vec<Outbound> {
        self.play(1, 0, 0);
        self.play(2, 1, 0);
        self.play(1, 0, 1);
        self.play(2, 1, 1);
        self.play(1, 0, 2)
    }
}

fn id(n: u64) -> ConnectionId {
    ConnectionId::new(n)
}

fn to(n: u64, event: ServerEvent) -> Outbound {
    Outbound::new(id(n), event)
}

fn events_for(out: &[Outbound], n: u64) -> Vec<ServerEvent> {
    out.iter()
        .filter(|o| o.to == id(n))
        .map(|o| o.event.clone())
        .collect()
}

fn replay_records(out: &[Outbound]) -> Vec<String> {
    out.iter()
        .filter_map(|o| match &o.event {
            ServerEvent::ReplayTransferData { record } => Some(record.clone()),
            _ => None,
        })
        .collect()
}

// =========================================================================
// Accounts
// =========================================================================

#[test]
fn test_create_account_duplicate_name_fails_and_keeps_original() {
    let mut h = Harness::new();
    let create = |name: &str, password: &str| ClientCommand::CreateAccount {
        name: name.into(),
        password: password.into(),
    };

    assert_eq!(
        h.send(1, create("bob", "pw")),
        vec![to(1, ServerEvent::AccountCreationComplete)]
    );
    assert_eq!(
        h.send(2, create("bob", "other")),
        vec![to(2, ServerEvent::AccountCreationFailed)]
    );

    let store = h.dispatcher.accounts().store();
    assert_eq!(store.len(), 1);
    assert_eq!(store.lookup("bob").unwrap().password, "pw");
}

#[test]
fn test_login_checks_password() {
    let mut h = Harness::new();
    h.send(
        1,
        ClientCommand::CreateAccount {
            name: "ann".into(),
            password: "pw".into(),
        },
    );

    let wrong = h.send(
        1,
        ClientCommand::Login {
            name: "ann".into(),
            password: "nope".into(),
        },
    );
    assert_eq!(wrong, vec![to(1, ServerEvent::LoginFailed)]);

    let right = h.send(
        1,
        ClientCommand::Login {
            name: "ann".into(),
            password: "pw".into(),
        },
    );
    assert_eq!(right, vec![to(1, ServerEvent::LoginComplete)]);
    assert_eq!(h.dispatcher.accounts().account_name(id(1)), Some("ann"));
}

// =========================================================================
// Matchmaking and play
// =========================================================================

#[test]
fn test_pairing_starts_game_for_both_sides() {
    let mut h = Harness::new();
    assert!(h.send(1, ClientCommand::JoinQueueForGameRoom).is_empty());
    let out = h.send(2, ClientCommand::JoinQueueForGameRoom);

    assert_eq!(
        out,
        vec![
            to(
                1,
                ServerEvent::GameStart {
                    me: Side::A,
                    opponent: Side::B
                }
            ),
            to(
                2,
                ServerEvent::GameStart {
                    me: Side::B,
                    opponent: Side::A
                }
            ),
            to(1, ServerEvent::DoTurn),
            to(2, ServerEvent::WaitForTurn),
        ]
    );
    assert!(h.dispatcher.queue().is_empty());
    assert_eq!(h.dispatcher.registry().len(), 1);
}

#[test]
fn test_duplicate_enqueue_does_not_self_pair() {
    let mut h = Harness::new();
    h.send(1, ClientCommand::JoinQueueForGameRoom);
    assert!(h.send(1, ClientCommand::JoinQueueForGameRoom).is_empty());
    assert_eq!(h.dispatcher.queue().waiting(), Some(id(1)));
    assert!(h.dispatcher.registry().is_empty());
}

#[test]
fn test_play_broadcasts_mark_and_hands_over_turn() {
    let mut h = Harness::new();
    h.pair();

    let out = h.play(1, 1, 1);
    let mark = ServerEvent::MarkSpace {
        x: 1,
        y: 1,
        side: Side::A,
    };
    assert_eq!(
        out,
        vec![
            to(1, mark.clone()),
            to(2, mark),
            to(2, ServerEvent::DoTurn),
            to(1, ServerEvent::WaitForTurn),
        ]
    );
}

#[test]
fn test_column_win_reports_recipient_relative_result() {
    let mut h = Harness::new();
    h.pair();
    let out = h.play_column_win();

    assert_eq!(
        events_for(&out, 1),
        vec![
            ServerEvent::MarkSpace {
                x: 0,
                y: 2,
                side: Side::A
            },
            ServerEvent::CurrentPlayerWin,
        ]
    );
    assert_eq!(events_for(&out, 2).last(), Some(&ServerEvent::OtherPlayerWin));

    let session = h.dispatcher.registry().lookup(id(1)).unwrap();
    assert_eq!(session.state(), SessionState::Won(Side::A));
    assert_eq!(session.replay_index(), Some(1));
    assert_eq!(h.dispatcher.replays().last_used(), Some(1));
}

#[test]
fn test_draw_fires_on_ninth_move_and_persists() {
    let mut h = Harness::new();
    h.pair();

    // A B A / A B B / B A A
    let plays = [
        (1, 0, 0),
        (2, 1, 0),
        (1, 2, 0),
        (2, 1, 1),
        (1, 0, 1),
        (2, 2, 1),
        (1, 1, 2),
        (2, 0, 2),
    ];
    for (from, x, y) in plays {
        let out = h.play(from, x, y);
        assert!(!out.iter().any(|o| o.event == ServerEvent::Draw));
    }

    let out = h.play(1, 2, 2);
    assert_eq!(events_for(&out, 1).last(), Some(&ServerEvent::Draw));
    assert_eq!(events_for(&out, 2).last(), Some(&ServerEvent::Draw));
    assert_eq!(h.dispatcher.replays().last_used(), Some(1));
}

#[test]
fn test_strict_policy_ignores_out_of_turn_and_occupied_plays() {
    let mut h = Harness::new();
    h.pair();

    assert!(h.play(2, 0, 0).is_empty(), "B may not open");
    h.play(1, 0, 0);
    assert!(h.play(1, 1, 1).is_empty(), "A may not move twice");
    assert!(h.play(2, 0, 0).is_empty(), "cell already taken");
    assert!(h.play(2, 3, 0).is_empty(), "outside the grid");
    assert_eq!(h.dispatcher.registry().lookup(id(1)).unwrap().move_count(), 1);
}

#[test]
fn test_lenient_policy_overwrites_occupied_cell() {
    let config = DispatchConfig {
        room: RoomConfig {
            move_policy: MovePolicy::Lenient,
            ..RoomConfig::default()
        },
        ..DispatchConfig::default()
    };
    let mut h = Harness::with_config(config);
    h.pair();

    h.play(1, 0, 0);
    let out = h.play(2, 0, 0);
    assert_eq!(
        out[0].event,
        ServerEvent::MarkSpace {
            x: 0,
            y: 0,
            side: Side::B
        }
    );
    let session = h.dispatcher.registry().lookup(id(1)).unwrap();
    assert_eq!(session.move_count(), 2);
}

#[test]
fn test_play_after_win_is_ignored() {
    let mut h = Harness::new();
    h.pair();
    h.play_column_win();
    assert!(h.play(2, 2, 2).is_empty());
}

#[test]
fn test_play_without_session_is_ignored() {
    let mut h = Harness::new();
    assert!(h.play(7, 0, 0).is_empty());
}

// =========================================================================
// Spectators
// =========================================================================

#[test]
fn test_observer_joins_running_session_and_sees_moves() {
    let mut h = Harness::new();
    h.pair();

    let joined = h.send(9, ClientCommand::JoinQueueAsObserver);
    assert_eq!(
        joined,
        vec![to(
            9,
            ServerEvent::GameStartForObserver {
                first: Side::A,
                second: Side::B
            }
        )]
    );

    assert!(h.send(9, ClientCommand::JoinQueueAsObserver).is_empty());

    let out = h.play(1, 2, 2);
    assert_eq!(
        events_for(&out, 9),
        vec![ServerEvent::MarkSpace {
            x: 2,
            y: 2,
            side: Side::A
        }]
    );
}

#[test]
fn test_pending_observer_is_attached_when_session_forms() {
    let mut h = Harness::new();
    assert!(h.send(9, ClientCommand::JoinQueueAsObserver).is_empty());

    h.send(1, ClientCommand::JoinQueueForGameRoom);
    let out = h.send(2, ClientCommand::JoinQueueForGameRoom);
    assert_eq!(
        events_for(&out, 9),
        vec![ServerEvent::GameStartForObserver {
            first: Side::A,
            second: Side::B
        }]
    );
}

#[test]
fn test_spectator_sees_current_player_win() {
    let mut h = Harness::new();
    h.pair();
    h.send(9, ClientCommand::JoinQueueAsObserver);
    let out = h.play_column_win();
    assert_eq!(events_for(&out, 9).last(), Some(&ServerEvent::CurrentPlayerWin));
}

// =========================================================================
// Chat
// =========================================================================

#[test]
fn test_chat_without_session_sends_nothing() {
    let mut h = Harness::new();
    let out = h.send(5, ClientCommand::ChatSend { text: "hello".into() });
    assert!(out.is_empty());
}

#[test]
fn test_chat_relays_to_players_and_spectators() {
    let mut h = Harness::new();
    h.pair();
    h.send(9, ClientCommand::JoinQueueAsObserver);

    let out = h.send(
        2,
        ClientCommand::ChatSend {
            text: "good luck, have fun".into(),
        },
    );
    let relay = ServerEvent::ChatRelay {
        text: "[2]: good luck, have fun".into(),
    };
    assert_eq!(
        out,
        vec![to(1, relay.clone()), to(2, relay.clone()), to(9, relay)]
    );
}

// =========================================================================
// Replay
// =========================================================================

#[test]
fn test_replay_of_saved_session_is_byte_identical_across_requests() {
    let mut h = Harness::new();
    h.pair();
    h.play_column_win();

    let first = h.send(1, ClientCommand::RequestReplay);
    let second = h.send(1, ClientCommand::RequestReplay);
    assert_eq!(first, second);

    assert_eq!(first.first(), Some(&to(1, ServerEvent::ReplayTransferStart)));
    assert_eq!(first.last(), Some(&to(1, ServerEvent::ReplayTransferEnd)));

    let records = replay_records(&first);
    assert_eq!(records.len(), 6, "settings record plus five moves");
    assert!(records[0].starts_with("1,1,2,3,3,"));
    assert!(records[5].starts_with("2,1,0,2,"));

    let decoded = ReplayLog::deserialize(&records).unwrap();
    let live = h.dispatcher.registry().lookup(id(1)).unwrap().replay();
    assert_eq!(decoded.moves(), live.moves());
}

#[test]
fn test_replay_of_unfinished_session_streams_live_log() {
    let mut h = Harness::new();
    h.pair();
    h.play(1, 1, 1);

    let records = replay_records(&h.send(2, ClientCommand::RequestReplay));
    assert_eq!(records.len(), 2);
    assert!(records[1].starts_with("2,1,1,1,"));
}

#[test]
fn test_replay_without_session_sends_nothing() {
    let mut h = Harness::new();
    assert!(h.send(4, ClientCommand::RequestReplay).is_empty());

    h.pair();
    h.play_column_win();
    assert!(h.send(4, ClientCommand::RequestReplay).is_empty());
}

#[test]
fn test_last_saved_source_streams_latest_replay_to_session_members_only() {
    let config = DispatchConfig {
        replay_source: ReplaySource::LastSaved,
        ..DispatchConfig::default()
    };
    let mut h = Harness::with_config(config);
    h.pair();
    h.play_column_win();

    assert!(h.send(42, ClientCommand::RequestReplay).is_empty());

    let player = h.send(1, ClientCommand::RequestReplay);
    assert_eq!(player.len(), 8);
    assert_eq!(replay_records(&player).len(), 6);

    // A later, unfinished session still streams the last saved one.
    h.send(3, ClientCommand::JoinQueueForGameRoom);
    h.send(4, ClientCommand::JoinQueueForGameRoom);
    assert_eq!(
        replay_records(&h.send(3, ClientCommand::RequestReplay)),
        replay_records(&player)
    );
}

// =========================================================================
// Disconnect and shutdown
// =========================================================================

#[test]
fn test_disconnect_frees_matchmaking_slot() {
    let mut h = Harness::new();
    h.send(1, ClientCommand::JoinQueueForGameRoom);
    h.dispatcher.disconnect(id(1));
    assert!(h.dispatcher.queue().is_empty());

    h.send(2, ClientCommand::JoinQueueForGameRoom);
    assert_eq!(h.dispatcher.queue().waiting(), Some(id(2)));
}

#[test]
fn test_disconnect_without_eviction_keeps_slot() {
    let config = DispatchConfig {
        evict_on_disconnect: false,
        ..DispatchConfig::default()
    };
    let mut h = Harness::with_config(config);
    h.send(1, ClientCommand::JoinQueueForGameRoom);
    h.dispatcher.disconnect(id(1));
    assert_eq!(h.dispatcher.queue().waiting(), Some(id(1)));
}

#[test]
fn test_disconnect_keeps_finished_session_for_opponent() {
    let mut h = Harness::new();
    h.pair();
    h.play_column_win();
    h.dispatcher.disconnect(id(1));

    let out = h.send(2, ClientCommand::ChatSend { text: "gg".into() });
    assert_eq!(out.len(), 2);
}

#[test]
fn test_shutdown_flushes_index() {
    let mut h = Harness::new();
    h.dispatcher.shutdown().unwrap();
    let index = h.dispatcher.replays().dir().join("replay_index.txt");
    assert!(index.exists());
}

#[test]
fn test_row_win_reports_result() {
    let mut h = Harness::new();
    h.pair();
    h.play(1, 0, 1);
    h.play(2, 0, 0);
    h.play(1, 1, 1);
    h.play(2, 2, 2);
    let out = h.play(1, 2, 1);
    assert_eq!(events_for(&out, 1).last(), Some(&ServerEvent::CurrentPlayerWin));
    assert_eq!(events_for(&out, 2).last(), Some(&ServerEvent::OtherPlayerWin));
}
