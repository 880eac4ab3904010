//! # GlideTrax
//!
//! Synchronised replay engine for glider and paraglider flight logs.
//!
//! This library provides:
//! - IGC flight log ingestion with per-file error reporting
//! - An in-memory track store with rename/remove operations
//! - A drift-free replay clock (play, pause, reset, seek, speed changes)
//! - Time-based position resolution over many tracks with different sample rates
//! - Renderer-agnostic frame projection (progressive paths, markers, labels)
//! - A frame-driven player that owns renderer resources for a session's lifetime
//!
//! ## Features
//!
//! - **`parallel`** - Project per-track frames with rayon
//! - **`cli`** - Build the `glidetrax-cli` terminal replay tool
//!
//! ## Quick Start
//!
//! ```rust
//! use glidetrax::{Ingestor, ManualTimeSource, ReplayConfig, ReplaySession, ReplayClock};
//! use glidetrax::synthetic::SyntheticFlight;
//!
//! let igc = SyntheticFlight::default().to_igc();
//!
//! let mut ingestor = Ingestor::seeded(ReplayConfig::default(), 7);
//! let report = ingestor.ingest([("flight.igc", igc.as_bytes())]);
//! assert!(report.failures.is_empty());
//!
//! let session = ReplaySession::new(report.tracks).unwrap();
//! let time = ManualTimeSource::new();
//! let mut clock = ReplayClock::new(time.clone(), &ReplayConfig::default());
//! clock.load(session.total_duration_ms());
//!
//! clock.play();
//! time.advance(1_000.0);
//! assert_eq!(clock.tick().elapsed_ms, 1_000.0);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{IngestError, OptionExt, ReplayError, Result};

// Replay configuration
pub mod config;
pub use config::{PathMode, ReplayConfig};

// Track model (fixes + relative timeline)
pub mod track;
pub use track::{DEFAULT_PALETTE, Track};

// IGC flight log parsing
pub mod igc;

// Multi-file ingestion
pub mod ingest;
pub use ingest::{IngestFailure, IngestReport, Ingestor};

// Uploaded track collection
pub mod store;
pub use store::TrackStore;

// Frozen set of tracks being replayed
pub mod session;
pub use session::ReplaySession;

// Elapsed time -> sample index lookup
pub mod resolver;
pub use resolver::{CurrentPosition, IndexCursor, current_position, resolve_index};

// Play/pause/seek/speed state machine
pub mod clock;
pub use clock::{
    ManualTimeSource, PlaybackSnapshot, PlaybackStatus, ReplayClock, SystemTimeSource, TickOutcome,
    TimeSource, format_clock,
};

// Renderer-agnostic frame descriptions
pub mod projector;
pub use projector::{TrackFrame, project, project_at, project_with_cursors};

// Renderer adapters
pub mod render;
pub use render::{GeoJsonRenderer, Renderer, TextRenderer};

// Frame scheduling and session lifetime
pub mod player;
pub use player::{FrameRequest, ReplayPlayer};

// Generated flights for tests and benchmarks
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A geographic position with altitude.
///
/// # Example
/// ```
/// use glidetrax::GeoPoint;
/// let point = GeoPoint::new(46.0207, 7.7491, 3200.0); // Zermatt
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude in meters (0 when the recorder reported none)
    #[serde(default)]
    pub altitude: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// One timestamped GPS sample. Immutable once parsed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Absolute UTC time of the sample
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude in meters, defaults to 0
    #[serde(default)]
    pub altitude: f64,
}

impl Fix {
    /// Create a new fix.
    pub fn new(timestamp: DateTime<Utc>, latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
            altitude,
        }
    }

    /// The position of this fix.
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude, self.altitude)
    }
}

/// Geographic bounding box, used as the renderer's initial viewport hint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from points.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let mut bounds: Option<Self> = None;
        for p in points {
            bounds = Some(match bounds {
                None => Self {
                    min_lat: p.latitude,
                    max_lat: p.latitude,
                    min_lng: p.longitude,
                    max_lng: p.longitude,
                },
                Some(b) => b.including(p),
            });
        }
        bounds
    }

    /// Grow the bounds to include a point.
    pub fn including(self, p: &GeoPoint) -> Self {
        Self {
            min_lat: self.min_lat.min(p.latitude),
            max_lat: self.max_lat.max(p.latitude),
            min_lng: self.min_lng.min(p.longitude),
            max_lng: self.max_lng.max(p.longitude),
        }
    }

    /// Smallest bounds covering both.
    pub fn union(self, other: &Bounds) -> Self {
        Self {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lng: self.min_lng.min(other.min_lng),
            max_lng: self.max_lng.max(other.max_lng),
        }
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
            0.0,
        )
    }

    /// True when the box has zero width or height, so a camera cannot fit it.
    pub fn is_degenerate(&self) -> bool {
        self.min_lat == self.max_lat || self.min_lng == self.max_lng
    }

    /// `[west, south, east, north]`, the GeoJSON `bbox` order.
    pub fn to_bbox(&self) -> [f64; 4] {
        [self.min_lng, self.min_lat, self.max_lng, self.max_lat]
    }
}
