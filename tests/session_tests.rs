//! Session: catalog, progress and level switching.

use hole_match::catalog::{load_catalog, parse_catalog};
use hole_match::core::types::{LevelEvent, LevelStatus, TICK_MS};
use hole_match::core::{LevelCatalog, MemoryProgress, ProgressStore, Session};
use hole_match::progress::FileProgressStore;

const TWO_LEVELS: &str = r#"{
    "levels": [
        {
            "name": "one",
            "timed": false,
            "container_count": 1,
            "columns": [{ "holes": [{ "color": "red" }] }],
            "cars": [{ "color": "red", "start": { "x": 0, "y": 0, "z": 10 } }]
        },
        {
            "name": "two",
            "time_limit_secs": 1,
            "container_count": 2,
            "columns": [{ "holes": [{ "color": "blue" }, { "color": "red" }] }],
            "cars": [
                { "color": "blue", "start": { "x": -3, "y": 0, "z": 10 } },
                { "color": "red", "start": { "x": 3, "y": 0, "z": 10 } }
            ]
        }
    ]
}"#;

fn catalog() -> LevelCatalog {
    parse_catalog(TWO_LEVELS).unwrap()
}

fn run_for<P: ProgressStore>(session: &mut Session<P>, ms: u32) {
    for _ in 0..ms.div_ceil(TICK_MS) {
        session.tick(TICK_MS);
    }
}

#[test]
fn test_builtin_catalog_starts_on_first_level() {
    let mut session = Session::new(load_catalog(None).unwrap(), MemoryProgress::default());
    session.start().unwrap();
    assert_eq!(session.level_index(), 0);
    assert_eq!(session.status(), Some(LevelStatus::Playing));
    assert!(session.level_count() >= 3);
}

#[test]
fn test_win_saves_next_level_but_stays_put() {
    let mut session = Session::new(catalog(), MemoryProgress::default());
    session.start().unwrap();
    session.tap_column(0).unwrap();
    run_for(&mut session, 5_000);

    assert_eq!(session.status(), Some(LevelStatus::Won));
    assert_eq!(session.progress().saved(), Some(1));
    assert_eq!(session.level_index(), 0);
    assert!(session.drain_events().any(|e| e == LevelEvent::LevelWon));

    session.next_level().unwrap();
    assert_eq!(session.level_index(), 1);
    assert_eq!(session.level().unwrap().name(), Some("two"));
}

#[test]
fn test_next_level_past_the_end_loops_to_first() {
    let mut session = Session::new(catalog(), MemoryProgress::new(Some(1)));
    session.start().unwrap();
    assert_eq!(session.level_index(), 1);

    session.next_level().unwrap();
    assert_eq!(session.level_index(), 0);
    assert_eq!(session.progress().saved(), Some(0));
}

#[test]
fn test_restart_after_failure_gives_a_fresh_level() {
    let mut session = Session::new(catalog(), MemoryProgress::new(Some(1)));
    session.start().unwrap();
    run_for(&mut session, 1_100);
    assert!(matches!(session.status(), Some(LevelStatus::Failed(_))));

    session.restart().unwrap();
    assert_eq!(session.status(), Some(LevelStatus::Playing));
    assert_eq!(session.level().unwrap().board().hole_count(), 2);
    assert_eq!(session.level().unwrap().time_remaining_secs(), Some(1));
    assert_eq!(session.drain_events().count(), 0);
}

#[test]
fn test_progress_file_survives_sessions() {
    let path = std::env::temp_dir().join(format!(
        "hole-match-session-{}.json",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let mut session = Session::new(catalog(), FileProgressStore::new(&path));
    session.start().unwrap();
    assert_eq!(session.level_index(), 0);
    session.tap_column(0).unwrap();
    run_for(&mut session, 5_000);
    assert_eq!(session.status(), Some(LevelStatus::Won));

    let mut resumed = Session::new(catalog(), FileProgressStore::new(&path));
    resumed.start().unwrap();
    assert_eq!(resumed.level_index(), 1);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_corrupt_progress_file_starts_from_first_level() {
    let path = std::env::temp_dir().join(format!(
        "hole-match-corrupt-{}.json",
        std::process::id()
    ));
    std::fs::write(&path, "{").unwrap();

    let mut session = Session::new(catalog(), FileProgressStore::new(&path));
    session.start().unwrap();
    assert_eq!(session.level_index(), 0);

    let _ = std::fs::remove_file(&path);
}
