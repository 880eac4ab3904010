//! Position resolution: elapsed track time to sample index.
//!
//! The lookup is a monotonic step function over a track's relative
//! timeline: the result is the last fix at or before the elapsed time,
//! clamped to the track's first and last fix.

use serde::{Deserialize, Serialize};

use crate::Track;

/// Display summary of where a track's replay currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPosition {
    pub track_id: String,
    pub pilot_name: String,
    /// 1-based sample number, for display
    pub sample_number: usize,
    pub total_samples: usize,
}

/// Largest index whose relative timestamp is `<= elapsed_ms`, or 0.
///
/// Negative or NaN input resolves to 0; input past the track's end resolves
/// to the last index. Runs in O(log n).
pub fn resolve_index(track: &Track, elapsed_ms: f64) -> usize {
    let timeline = track.relative_ms();
    timeline
        .partition_point(|&t| (t as f64) <= elapsed_ms)
        .saturating_sub(1)
}

/// Current position summary for a track at an elapsed time.
pub fn current_position(track: &Track, elapsed_ms: f64) -> CurrentPosition {
    position_at(track, resolve_index(track, elapsed_ms))
}

pub(crate) fn position_at(track: &Track, index: usize) -> CurrentPosition {
    CurrentPosition {
        track_id: track.id.clone(),
        pilot_name: track.pilot_name.clone(),
        sample_number: index + 1,
        total_samples: track.len(),
    }
}

/// Incremental resolver for steadily increasing elapsed time.
///
/// During playback elapsed time only grows, and usually by less than a
/// sample per frame, so scanning forward from the previous index is cheaper
/// than a fresh binary search. Seeks backwards, or far forwards, fall back
/// to [`resolve_index`]. Results are always identical to `resolve_index`.
///
/// The cursor remembers which track it last resolved and starts over when
/// handed a different one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexCursor {
    index: usize,
    elapsed_ms: f64,
    track_id: String,
    track_len: usize,
}

impl IndexCursor {
    /// Forward steps tried before giving up and binary searching.
    const MAX_LINEAR_STEPS: usize = 32;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, track: &Track, elapsed_ms: f64) -> usize {
        let timeline = track.relative_ms();
        if self.track_id != track.id || self.track_len != timeline.len() {
            self.reset();
            self.track_id.clone_from(&track.id);
            self.track_len = timeline.len();
        }
        let resolved = if elapsed_ms >= self.elapsed_ms && self.index < timeline.len() {
            self.scan_forward(timeline, elapsed_ms)
                .unwrap_or_else(|| resolve_index(track, elapsed_ms))
        } else {
            resolve_index(track, elapsed_ms)
        };
        self.index = resolved;
        self.elapsed_ms = elapsed_ms;
        resolved
    }

    /// Forget the previous position, e.g. after a reset.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn scan_forward(&self, timeline: &[i64], elapsed_ms: f64) -> Option<usize> {
        let mut i = self.index;
        for _ in 0..Self::MAX_LINEAR_STEPS {
            match timeline.get(i + 1) {
                Some(&next) if (next as f64) <= elapsed_ms => i += 1,
                _ => return Some(i),
            }
        }
        None
    }
}
