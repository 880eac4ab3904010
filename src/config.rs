//! Replay configuration.

use serde::{Deserialize, Serialize};

use crate::track::DEFAULT_PALETTE;

/// How renderers should treat altitude when drawing paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMode {
    /// 2D map layers. Altitude is discarded at draw time.
    #[default]
    Flat,
    /// 3D overlay. Paths and markers carry altitude.
    Extruded,
}

/// Configuration for ingestion and playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Speed multiplier a new session starts with.
    /// Default: 1.0
    pub default_speed: f64,

    /// Slowest allowed speed multiplier. Requests below are clamped.
    /// Default: 0.5
    pub min_speed: f64,

    /// Fastest allowed speed multiplier. Requests above are clamped.
    /// Default: 10.0
    pub max_speed: f64,

    /// Period between animation frames when driving playback in real time.
    /// Default: 16 ms (~60 Hz)
    pub frame_interval_ms: u64,

    /// Colours assigned to tracks at parse time (CSS hex strings).
    pub palette: Vec<String>,

    /// Whether renderers draw flat or extruded paths.
    pub path_mode: PathMode,

    /// Skip malformed B records instead of rejecting the whole file.
    /// Default: true
    pub lenient: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            default_speed: 1.0,
            min_speed: 0.5,
            max_speed: 10.0,
            frame_interval_ms: 16,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            path_mode: PathMode::Flat,
            lenient: true,
        }
    }
}

impl ReplayConfig {
    /// Clamp a requested speed into the configured range.
    ///
    /// Returns `None` for non-finite or non-positive requests, and when a
    /// hand-edited range would clamp the request to a non-positive value.
    pub fn clamp_speed(&self, speed: f64) -> Option<f64> {
        if !speed.is_finite() || speed <= 0.0 {
            return None;
        }
        // max/min rather than clamp: a hand-edited config may invert the range
        let clamped = speed.max(self.min_speed).min(self.max_speed);
        (clamped.is_finite() && clamped > 0.0).then_some(clamped)
    }
}
