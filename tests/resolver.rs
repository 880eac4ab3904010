//! Tests for elapsed time -> sample index resolution

use glidetrax::synthetic::{SyntheticFlight, track_with_timeline};
use glidetrax::{IndexCursor, current_position, resolve_index};

#[test]
fn test_resolves_last_fix_at_or_before_elapsed() {
    let track = track_with_timeline("a", &[0, 1000, 2000, 4000]);

    assert_eq!(resolve_index(&track, 0.0), 0);
    assert_eq!(resolve_index(&track, 999.9), 0);
    assert_eq!(resolve_index(&track, 1000.0), 1);
    assert_eq!(resolve_index(&track, 3999.0), 2);
    assert_eq!(resolve_index(&track, 4000.0), 3);
}

#[test]
fn test_boundary_clamp() {
    let track = track_with_timeline("a", &[0, 1000, 2000, 4000]);

    assert_eq!(resolve_index(&track, -1.0), 0);
    assert_eq!(
        resolve_index(&track, track.duration_ms() as f64 + 1000.0),
        track.len() - 1
    );
    assert_eq!(resolve_index(&track, f64::NAN), 0);
    assert_eq!(resolve_index(&track, f64::INFINITY), track.len() - 1);
}

#[test]
fn test_monotonic_resolution() {
    let track = SyntheticFlight {
        samples: 500,
        sample_interval_secs: 3,
        ..SyntheticFlight::default()
    }
    .to_track("a", "#EF4444");

    let mut previous = 0;
    let mut t = -500.0;
    while t < track.duration_ms() as f64 + 5000.0 {
        let index = resolve_index(&track, t);
        assert!(index >= previous, "index went backwards at t={}", t);
        assert!(index < track.len());
        previous = index;
        t += 377.0;
    }
}

#[test]
fn test_equal_timestamps_resolve_to_last() {
    let track = track_with_timeline("a", &[0, 1000, 1000, 1000, 2000]);
    assert_eq!(resolve_index(&track, 1000.0), 3);
    assert_eq!(resolve_index(&track, 1500.0), 3);
}

#[test]
fn test_single_fix_track() {
    let track = track_with_timeline("a", &[0]);
    assert_eq!(resolve_index(&track, -5.0), 0);
    assert_eq!(resolve_index(&track, 0.0), 0);
    assert_eq!(resolve_index(&track, 60_000.0), 0);
}

#[test]
fn test_current_position_is_one_based() {
    let track = track_with_timeline("a", &[0, 1000, 2000]);
    let position = current_position(&track, 1500.0);

    assert_eq!(position.track_id, "a");
    assert_eq!(position.pilot_name, "Pilot a");
    assert_eq!(position.sample_number, 2);
    assert_eq!(position.total_samples, 3);
}

#[test]
fn test_cursor_matches_binary_search() {
    let track = SyntheticFlight {
        samples: 2000,
        ..SyntheticFlight::default()
    }
    .to_track("a", "#10B981");
    let mut cursor = IndexCursor::new();

    // Forward playback, a large forward jump, a backward seek, then forward again
    let mut times: Vec<f64> = (0..300).map(|i| i as f64 * 16.7).collect();
    times.push(1_500_000.0);
    times.push(20_000.0);
    times.extend((0..200).map(|i| 20_000.0 + i as f64 * 250.0));
    times.push(-10.0);

    for t in times {
        assert_eq!(cursor.resolve(&track, t), resolve_index(&track, t), "t={}", t);
    }
}

#[test]
fn test_cursor_reset() {
    let track = track_with_timeline("a", &[0, 1000, 2000]);
    let mut cursor = IndexCursor::new();

    assert_eq!(cursor.resolve(&track, 2500.0), 2);
    cursor.reset();
    assert_eq!(cursor.resolve(&track, 500.0), 0);
}

#[test]
fn test_cursor_moved_to_another_track() {
    let fast = track_with_timeline("fast", &[0, 1000, 2000, 3000, 4000, 5000]);
    let slow = track_with_timeline("slow", &[0, 10_000, 20_000, 30_000, 40_000, 50_000]);
    let short = track_with_timeline("short", &[0, 10_000]);
    let mut cursor = IndexCursor::new();

    assert_eq!(cursor.resolve(&fast, 4500.0), 4);
    // Same length, later timestamps: the saved index must not carry over
    assert_eq!(cursor.resolve(&slow, 5000.0), 0);
    assert_eq!(cursor.resolve(&short, 15_000.0), 1);
    assert_eq!(cursor.resolve(&fast, 15_000.0), 5);
}
