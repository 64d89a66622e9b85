//! Integration tests for replay persistence across store instances.

use std::fs;

use gridduel_protocol::{ConnectionId, Side};
use gridduel_replay::{ReplayError, ReplayLog, ReplayStore, SessionMeta, Timestamp};

fn finished_log(a: u64, b: u64, moves: &[(Side, usize, usize)]) -> ReplayLog {
    let start = Timestamp::from_fields(2026, 10, 14, 20, 15, 0).unwrap();
    let mut log = ReplayLog::new(SessionMeta {
        player_a: ConnectionId::new(a),
        player_b: ConnectionId::new(b),
        grid_width: 3,
        grid_height: 3,
        started_at: start,
    });
    for (i, (side, x, y)) in moves.iter().enumerate() {
        let at = Timestamp::from_fields(2026, 10, 14, 20, 15, i as u32 + 1).unwrap();
        log.append(*side, *x, *y, at);
    }
    log
}

#[test]
fn test_saved_replay_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ReplayStore::open(dir.path()).unwrap();
    let log = finished_log(
        1,
        2,
        &[
            (Side::A, 0, 0),
            (Side::B, 1, 0),
            (Side::A, 0, 1),
            (Side::B, 1, 1),
            (Side::A, 0, 2),
        ],
    );

    let index = store.save(&log, &log.meta().participants_label()).unwrap();
    drop(store);

    let store = ReplayStore::open(dir.path()).unwrap();
    let loaded = store.load(index).unwrap();
    assert_eq!(loaded.moves(), log.moves());
    assert_eq!(loaded.meta(), log.meta());
    assert_eq!(store.entries()[0].label, "1,2");
}

#[test]
fn test_repeated_loads_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ReplayStore::open(dir.path()).unwrap();
    let index = store
        .save(&finished_log(4, 5, &[(Side::A, 2, 2)]), "4,5")
        .unwrap();

    let first = store.load_records(index).unwrap();
    let second = store.load_records(index).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_failed_save_leaves_counter_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ReplayStore::open(dir.path()).unwrap();

    // A directory where the replay file should go makes the rename fail.
    fs::create_dir(dir.path().join("replay_1.txt")).unwrap();

    let result = store.save(&finished_log(1, 2, &[]), "1,2");
    assert!(matches!(result, Err(ReplayError::Io(_))));
    assert_eq!(store.last_used(), None);
    assert!(store.entries().is_empty());
    assert!(!dir.path().join("replay_index.txt").exists());
}

#[test]
fn test_index_file_tolerates_unknown_records() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("replay_index.txt"),
        "1,3\n2,3,8,9\n42,reserved\n",
    )
    .unwrap();

    let mut store = ReplayStore::open(dir.path()).unwrap();
    assert_eq!(store.last_used(), Some(3));
    assert_eq!(store.save(&finished_log(1, 2, &[]), "1,2").unwrap(), 4);
}
