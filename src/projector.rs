//! Render projection.
//!
//! Turns `(session, elapsed time)` into one renderer-agnostic frame per
//! track: the path revealed so far, the marker position, colour and label.
//! Projection is a pure function of its inputs, so repeated calls with the
//! same state produce identical frames.

use serde::Serialize;

use crate::clock::PlaybackSnapshot;
use crate::resolver::{CurrentPosition, IndexCursor, position_at, resolve_index};
use crate::{Fix, GeoPoint, ReplaySession, Track};

/// What to draw for one track at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackFrame {
    pub track_id: String,
    /// CSS colour for path, marker and label
    pub color: String,
    /// Label text (the pilot name)
    pub label: String,
    /// Fixes 0..=current index, for progressive path drawing
    pub path: Vec<GeoPoint>,
    /// Current marker position (last point of `path`)
    pub marker: GeoPoint,
    /// Progress summary for the controls surface
    pub position: CurrentPosition,
}

impl TrackFrame {
    fn build(track: &Track, index: usize) -> Self {
        debug_assert!(index < track.len(), "resolver returned {} for {} fixes", index, track.len());
        let path: Vec<GeoPoint> = track.fixes()[..=index].iter().map(Fix::point).collect();
        let marker = path[index];

        Self {
            track_id: track.id.clone(),
            color: track.color.clone(),
            label: track.pilot_name.clone(),
            path,
            marker,
            position: position_at(track, index),
        }
    }

    /// 0-based index of the current fix.
    pub fn sample_index(&self) -> usize {
        self.position.sample_number - 1
    }
}

/// Project every track in the session at the snapshot's elapsed time.
pub fn project(session: &ReplaySession, state: &PlaybackSnapshot) -> Vec<TrackFrame> {
    project_at(session, state.elapsed_ms)
}

/// Project every track in the session at an elapsed time.
#[cfg(not(feature = "parallel"))]
pub fn project_at(session: &ReplaySession, elapsed_ms: f64) -> Vec<TrackFrame> {
    session
        .tracks()
        .iter()
        .map(|track| TrackFrame::build(track, resolve_index(track, elapsed_ms)))
        .collect()
}

/// Project every track in the session at an elapsed time.
///
/// Tracks are independent, so frames are built on the rayon pool; output
/// order still follows the session's track order.
#[cfg(feature = "parallel")]
pub fn project_at(session: &ReplaySession, elapsed_ms: f64) -> Vec<TrackFrame> {
    use rayon::prelude::*;

    session
        .tracks()
        .par_iter()
        .map(|track| TrackFrame::build(track, resolve_index(track, elapsed_ms)))
        .collect()
}

/// Same output as [`project_at`], resolving through per-track cursors.
///
/// `cursors` is resized to the session's track count.
#[cfg(not(feature = "parallel"))]
pub fn project_with_cursors(
    session: &ReplaySession,
    elapsed_ms: f64,
    cursors: &mut Vec<IndexCursor>,
) -> Vec<TrackFrame> {
    cursors.resize(session.len(), IndexCursor::new());
    session
        .tracks()
        .iter()
        .zip(cursors.iter_mut())
        .map(|(track, cursor)| TrackFrame::build(track, cursor.resolve(track, elapsed_ms)))
        .collect()
}

/// Same output as [`project_at`], resolving through per-track cursors.
///
/// `cursors` is resized to the session's track count. Each track and its
/// cursor are handled on the rayon pool.
#[cfg(feature = "parallel")]
pub fn project_with_cursors(
    session: &ReplaySession,
    elapsed_ms: f64,
    cursors: &mut Vec<IndexCursor>,
) -> Vec<TrackFrame> {
    use rayon::prelude::*;

    cursors.resize(session.len(), IndexCursor::new());
    session
        .tracks()
        .par_iter()
        .zip(cursors.par_iter_mut())
        .map(|(track, cursor)| TrackFrame::build(track, cursor.resolve(track, elapsed_ms)))
        .collect()
}

/// Current positions for the controls surface, one per track.
pub fn positions(frames: &[TrackFrame]) -> Vec<CurrentPosition> {
    frames.iter().map(|f| f.position.clone()).collect()
}
