//! Track model.
//!
//! A track pairs its fixes with a relative timeline in milliseconds that
//! starts at 0 for the first fix. Both sequences are built together in a
//! single pass and are never filtered independently, so an index into one
//! is always an index into the other.

use std::sync::Arc;

use log::warn;
use serde::Serialize;

use crate::error::IngestError;
use crate::{Bounds, Fix, GeoPoint};

/// Colours assigned to tracks at parse time.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#3B82F6", // blue
    "#EF4444", // red
    "#10B981", // green
    "#F59E0B", // yellow
    "#8B5CF6", // purple
    "#F97316", // orange
    "#06B6D4", // cyan
    "#EC4899", // pink
];

/// One uploaded flight log.
///
/// Fix data is shared behind `Arc`, so cloning a track (for a store update or
/// a session snapshot) does not copy samples.
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    /// Unique, stable for the session
    pub id: String,
    /// Display name, typically the file name
    pub name: String,
    /// Pilot name, editable by the user
    pub pilot_name: String,
    /// CSS colour used for path, marker and label
    pub color: String,
    fixes: Arc<[Fix]>,
    relative_ms: Arc<[i64]>,
}

impl Track {
    /// Build a track from parsed fixes.
    ///
    /// Fixes with invalid coordinates are dropped here, once, before the
    /// relative timeline is derived. A timestamp earlier than its predecessor
    /// is clamped to the predecessor's relative time so the timeline stays
    /// sorted.
    ///
    /// Returns `IngestError::NoValidFixes` if nothing survives the filter.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        pilot_name: impl Into<String>,
        color: impl Into<String>,
        fixes: impl IntoIterator<Item = Fix>,
    ) -> Result<Self, IngestError> {
        let id = id.into();
        let mut kept: Vec<Fix> = Vec::new();
        let mut relative: Vec<i64> = Vec::new();
        let mut clamped = 0usize;

        for fix in fixes {
            if !fix.point().is_valid() {
                continue;
            }
            let offset = match kept.first() {
                Some(first) => (fix.timestamp - first.timestamp).num_milliseconds(),
                None => 0,
            };
            let previous = relative.last().copied().unwrap_or(0);
            if offset < previous {
                clamped += 1;
            }
            relative.push(offset.max(previous));
            kept.push(fix);
        }

        if kept.is_empty() {
            return Err(IngestError::NoValidFixes);
        }

        if clamped > 0 {
            warn!(
                "[Track] {}: clamped {} out-of-order timestamps to keep the timeline monotonic",
                id, clamped
            );
        }

        Ok(Self {
            id,
            name: name.into(),
            pilot_name: pilot_name.into(),
            color: color.into(),
            fixes: kept.into(),
            relative_ms: relative.into(),
        })
    }

    /// Fixes in chronological order.
    pub fn fixes(&self) -> &[Fix] {
        &self.fixes
    }

    /// Milliseconds since the first fix, parallel to [`Track::fixes`].
    pub fn relative_ms(&self) -> &[i64] {
        &self.relative_ms
    }

    /// Number of fixes (always at least 1).
    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    /// Time from first to last fix. Zero for single-fix tracks.
    pub fn duration_ms(&self) -> i64 {
        self.relative_ms.last().copied().unwrap_or(0)
    }

    /// Position of the fix at `index`.
    pub fn point(&self, index: usize) -> Option<GeoPoint> {
        self.fixes.get(index).map(Fix::point)
    }

    /// Bounding box over all fixes.
    pub fn bounds(&self) -> Option<Bounds> {
        let points: Vec<GeoPoint> = self.fixes.iter().map(Fix::point).collect();
        Bounds::from_points(&points)
    }

    /// Copy of this track with a different pilot name. Samples are shared.
    pub fn with_pilot_name(&self, pilot_name: impl Into<String>) -> Self {
        Self {
            pilot_name: pilot_name.into(),
            ..self.clone()
        }
    }
}
