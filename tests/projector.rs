//! Tests for frame projection

use glidetrax::synthetic::{SyntheticFlight, track_with_timeline};
use glidetrax::{
    IndexCursor, ManualTimeSource, ReplayClock, ReplayConfig, ReplaySession, project, project_at,
    project_with_cursors,
};

fn two_track_session() -> ReplaySession {
    // A lasts 8000 ms, B lasts 12000 ms
    let a = track_with_timeline("a", &[0, 2000, 4000, 6000, 8000]);
    let b = track_with_timeline("b", &[0, 3000, 6000, 9000, 12000]);
    ReplaySession::new(vec![a, b]).unwrap()
}

#[test]
fn test_multi_track_duration() {
    let session = two_track_session();
    assert_eq!(session.total_duration_ms(), 12_000);

    let frames = project_at(&session, 9_000.0);
    let a = &frames[0];
    let b = &frames[1];

    assert_eq!(a.sample_index(), 4);
    assert_eq!(a.position.sample_number, a.position.total_samples);
    assert_eq!(b.sample_index(), 3);
    assert!(b.sample_index() < session.tracks()[1].len() - 1);
}

#[test]
fn test_frame_contents() {
    let session = two_track_session();
    let frames = project_at(&session, 4_500.0);
    let a = &frames[0];
    let track = &session.tracks()[0];

    assert_eq!(a.track_id, "a");
    assert_eq!(a.label, "Pilot a");
    assert_eq!(a.color, track.color);
    assert_eq!(a.path.len(), 3);
    assert_eq!(a.marker, track.point(2).unwrap());
    assert_eq!(a.path.last(), Some(&a.marker));
    assert_eq!(a.position.sample_number, 3);
    assert_eq!(a.position.total_samples, 5);
}

#[test]
fn test_frames_follow_session_order() {
    let session = two_track_session();
    let ids: Vec<String> = project_at(&session, 0.0)
        .into_iter()
        .map(|f| f.track_id)
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn test_start_shows_first_fix_only() {
    let session = two_track_session();
    for frame in project_at(&session, 0.0) {
        assert_eq!(frame.path.len(), 1);
        assert_eq!(frame.position.sample_number, 1);
    }
}

#[test]
fn test_projection_purity() {
    let flights: Vec<_> = (0..4)
        .map(|i| {
            SyntheticFlight {
                samples: 300 + i * 50,
                seed: i as u64,
                ..SyntheticFlight::default()
            }
            .to_track(&format!("t{}", i), "#F59E0B")
        })
        .collect();
    let session = ReplaySession::new(flights).unwrap();

    let time = ManualTimeSource::new();
    let mut clock = ReplayClock::new(time.clone(), &ReplayConfig::default());
    clock.load(session.total_duration_ms());
    clock.play();
    time.advance(123_456.0);
    clock.tick();
    clock.pause();

    let state = clock.snapshot();
    let first = serde_json::to_vec(&project(&session, &state)).unwrap();
    let second = serde_json::to_vec(&project(&session, &state)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_cursor_projection_matches_pure_projection() {
    let session = two_track_session();
    let mut cursors: Vec<IndexCursor> = Vec::new();

    for t in [0.0, 500.0, 2_000.0, 7_999.0, 11_000.0, 3_000.0, 13_000.0, -1.0] {
        assert_eq!(
            project_with_cursors(&session, t, &mut cursors),
            project_at(&session, t),
            "t={}",
            t
        );
    }
    assert_eq!(cursors.len(), 2);
}
