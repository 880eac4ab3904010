//! Uploaded track collection.
//!
//! Every mutation builds a new collection and swaps it in, so readers holding
//! a snapshot (the UI, a replay session) never observe a partial update.

use std::sync::Arc;

use log::warn;

use crate::Track;
use crate::error::{OptionExt, Result};

/// In-memory store of uploaded tracks, in insertion order.
///
/// Track ids are unique within the store at all times.
#[derive(Debug, Clone)]
pub struct TrackStore {
    tracks: Arc<[Track]>,
}

impl Default for TrackStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            tracks: Arc::from(Vec::new()),
        }
    }

    /// Append tracks.
    ///
    /// A track whose id is already present (in the store or earlier in the
    /// same batch) is skipped. Returns the ids that were added.
    pub fn add(&mut self, tracks: impl IntoIterator<Item = Track>) -> Vec<String> {
        let mut next: Vec<Track> = self.tracks.to_vec();
        let mut added = Vec::new();

        for track in tracks {
            if next.iter().any(|t| t.id == track.id) {
                warn!("[Store] duplicate track id {}, skipping", track.id);
                continue;
            }
            added.push(track.id.clone());
            next.push(track);
        }

        self.tracks = next.into();
        added
    }

    /// Change a track's pilot name.
    pub fn rename(&mut self, track_id: &str, pilot_name: &str) -> Result<()> {
        let index = self.position(track_id).ok_or_unknown_track(track_id)?;
        let next: Vec<Track> = self
            .tracks
            .iter()
            .enumerate()
            .map(|(i, t)| {
                if i == index {
                    t.with_pilot_name(pilot_name)
                } else {
                    t.clone()
                }
            })
            .collect();
        self.tracks = next.into();
        Ok(())
    }

    /// Remove a track, returning it.
    pub fn remove(&mut self, track_id: &str) -> Result<Track> {
        let index = self.position(track_id).ok_or_unknown_track(track_id)?;
        let mut next = self.tracks.to_vec();
        let removed = next.remove(index);
        self.tracks = next.into();
        Ok(removed)
    }

    /// Remove all tracks.
    pub fn clear(&mut self) {
        self.tracks = Arc::from(Vec::new());
    }

    /// Get a track by id.
    pub fn get(&self, track_id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    /// Check if a track exists.
    pub fn contains(&self, track_id: &str) -> bool {
        self.position(track_id).is_some()
    }

    /// All tracks in insertion order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Frozen view of the current collection. Later mutations don't affect it.
    pub fn snapshot(&self) -> Arc<[Track]> {
        Arc::clone(&self.tracks)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn position(&self, track_id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == track_id)
    }
}
