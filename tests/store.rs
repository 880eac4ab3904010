//! Tests for TrackStore

use glidetrax::synthetic::track_with_timeline;
use glidetrax::{ReplayError, TrackStore};

fn sample_store() -> TrackStore {
    let mut store = TrackStore::new();
    store.add(vec![
        track_with_timeline("a", &[0, 1000]),
        track_with_timeline("b", &[0, 1000, 2000]),
    ]);
    store
}

#[test]
fn test_add_and_get() {
    let store = sample_store();

    assert_eq!(store.len(), 2);
    assert!(store.contains("a"));
    assert_eq!(store.get("b").unwrap().len(), 3);
}

#[test]
fn test_preserves_insertion_order() {
    let mut store = sample_store();
    store.add(vec![track_with_timeline("c", &[0])]);

    let ids: Vec<&str> = store.tracks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn test_duplicate_ids_skipped() {
    let mut store = sample_store();
    let added = store.add(vec![
        track_with_timeline("a", &[0, 5000]),
        track_with_timeline("d", &[0]),
        track_with_timeline("d", &[0, 10]),
    ]);

    assert_eq!(added, vec!["d"]);
    assert_eq!(store.len(), 3);
    assert_eq!(store.get("a").unwrap().duration_ms(), 1000);
    assert_eq!(store.get("d").unwrap().len(), 1);
}

#[test]
fn test_rename() {
    let mut store = sample_store();
    store.rename("a", "Jane Doe").unwrap();

    assert_eq!(store.get("a").unwrap().pilot_name, "Jane Doe");
    assert_eq!(store.get("b").unwrap().pilot_name, "Pilot b");
}

#[test]
fn test_remove() {
    let mut store = sample_store();

    let removed = store.remove("a").unwrap();
    assert_eq!(removed.id, "a");
    assert_eq!(store.len(), 1);
    assert!(!store.contains("a"));
}

#[test]
fn test_unknown_track() {
    let mut store = sample_store();

    assert!(matches!(
        store.remove("missing"),
        Err(ReplayError::UnknownTrack { .. })
    ));
    assert!(matches!(
        store.rename("missing", "x"),
        Err(ReplayError::UnknownTrack { .. })
    ));
    assert_eq!(store.len(), 2);
}

#[test]
fn test_updates_replace_whole_collection() {
    let mut store = sample_store();
    let before = store.snapshot();

    store.rename("b", "New Name").unwrap();

    assert_eq!(before[1].pilot_name, "Pilot b");
    assert_eq!(store.tracks()[1].pilot_name, "New Name");
}

#[test]
fn test_clear() {
    let mut store = sample_store();
    store.clear();
    assert!(store.is_empty());
}
