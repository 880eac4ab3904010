//! Replay session: the frozen set of tracks being replayed together.

use std::sync::Arc;

use log::info;

use crate::error::{ReplayError, Result};
use crate::{Bounds, Track, TrackStore};

/// Tracks selected for replay, with their shared duration and extent.
#[derive(Debug, Clone)]
pub struct ReplaySession {
    tracks: Arc<[Track]>,
    total_duration_ms: i64,
    bounds: Option<Bounds>,
}

impl ReplaySession {
    /// Create a session from a set of tracks.
    ///
    /// Every track has at least one fix (`Track::new` rejects empty input).
    /// Returns `EmptySession` when no tracks are given.
    pub fn new(tracks: impl Into<Arc<[Track]>>) -> Result<Self> {
        let tracks: Arc<[Track]> = tracks.into();

        if tracks.is_empty() {
            return Err(ReplayError::EmptySession);
        }

        // Single-fix tracks have duration 0 and never raise the max
        let total_duration_ms = tracks
            .iter()
            .filter(|t| t.len() >= 2)
            .map(Track::duration_ms)
            .max()
            .unwrap_or(0);

        let bounds = tracks
            .iter()
            .filter_map(Track::bounds)
            .reduce(|acc, b| acc.union(&b));

        info!(
            "[Session] {} tracks, total duration {} ms",
            tracks.len(),
            total_duration_ms
        );

        Ok(Self {
            tracks,
            total_duration_ms,
            bounds,
        })
    }

    /// Freeze the store's current contents into a session.
    pub fn from_store(store: &TrackStore) -> Result<Self> {
        Self::new(store.snapshot())
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Longest track duration, in milliseconds.
    pub fn total_duration_ms(&self) -> i64 {
        self.total_duration_ms
    }

    /// Extent of every fix in the session, used to fit the initial camera.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
