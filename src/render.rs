//! Renderer adapters.
//!
//! A renderer draws the frames produced by the projector. The core never
//! depends on a particular graphics stack; 2D and 3D targets are both
//! implementations of [`Renderer`] and differ only in their [`PathMode`].

use std::io::Write;

use serde_json::{Value, json};

use crate::config::PathMode;
use crate::error::Result;
use crate::projector::TrackFrame;
use crate::{Bounds, GeoPoint, PlaybackSnapshot};

/// Drawing backend for a replay session.
///
/// Lifetime: `initialize` once when the session starts, `draw_frame` for
/// every tick or state change, `teardown` exactly once when the session
/// ends (including when `initialize` failed).
pub trait Renderer {
    /// Whether this renderer draws altitude.
    fn path_mode(&self) -> PathMode {
        PathMode::Flat
    }

    /// Acquire per-track resources and fit the camera to `bounds`.
    fn initialize(&mut self, bounds: Option<&Bounds>, frames: &[TrackFrame]) -> Result<()>;

    /// Present all track frames for one tick as a single update.
    fn draw_frame(&mut self, frames: &[TrackFrame]) -> Result<()>;

    /// Release everything acquired in `initialize`.
    fn teardown(&mut self);
}

impl PathMode {
    /// Coordinate array for a point: `[lon, lat]` or `[lon, lat, alt]`.
    pub fn coordinates(&self, p: &GeoPoint) -> Vec<f64> {
        match self {
            PathMode::Flat => vec![p.longitude, p.latitude],
            PathMode::Extruded => vec![p.longitude, p.latitude, p.altitude],
        }
    }
}

/// Writes one GeoJSON document per line: a viewport on initialize, then a
/// `FeatureCollection` per frame with a path `LineString` and a marker
/// `Point` for each track.
pub struct GeoJsonRenderer<W: Write> {
    out: W,
    mode: PathMode,
    layers: Vec<String>,
    frames_drawn: u64,
}

impl<W: Write> GeoJsonRenderer<W> {
    pub fn new(out: W, mode: PathMode) -> Self {
        Self {
            out,
            mode,
            layers: Vec::new(),
            frames_drawn: 0,
        }
    }

    /// Track ids with live path/marker layers.
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn feature_collection(&self, frames: &[TrackFrame]) -> Value {
        let features: Vec<Value> = frames
            .iter()
            .flat_map(|frame| {
                let path: Vec<Vec<f64>> =
                    frame.path.iter().map(|p| self.mode.coordinates(p)).collect();
                [
                    json!({
                        "type": "Feature",
                        "id": format!("track-{}", frame.track_id),
                        "properties": { "color": frame.color },
                        "geometry": { "type": "LineString", "coordinates": path },
                    }),
                    json!({
                        "type": "Feature",
                        "id": format!("label-{}", frame.track_id),
                        "properties": {
                            "pilotName": frame.label,
                            "color": frame.color,
                            "position": frame.position.sample_number,
                            "total": frame.position.total_samples,
                        },
                        "geometry": {
                            "type": "Point",
                            "coordinates": self.mode.coordinates(&frame.marker),
                        },
                    }),
                ]
            })
            .collect();

        json!({ "type": "FeatureCollection", "features": features })
    }
}

impl<W: Write> Renderer for GeoJsonRenderer<W> {
    fn path_mode(&self) -> PathMode {
        self.mode
    }

    fn initialize(&mut self, bounds: Option<&Bounds>, frames: &[TrackFrame]) -> Result<()> {
        let bbox = bounds.filter(|b| !b.is_degenerate()).map(Bounds::to_bbox);
        let viewport = json!({ "type": "Viewport", "bbox": bbox });
        serde_json::to_writer(&mut self.out, &viewport)?;
        writeln!(self.out)?;
        self.layers = frames.iter().map(|f| f.track_id.clone()).collect();
        Ok(())
    }

    fn draw_frame(&mut self, frames: &[TrackFrame]) -> Result<()> {
        let collection = self.feature_collection(frames);
        serde_json::to_writer(&mut self.out, &collection)?;
        writeln!(self.out)?;
        self.frames_drawn += 1;
        Ok(())
    }

    fn teardown(&mut self) {
        self.layers.clear();
        let _ = self.out.flush();
    }
}

/// Prints one status line per track, e.g. `Jane Doe  812/3600  46.0213,7.7480  2315m`.
pub struct TextRenderer<W: Write> {
    out: W,
    mode: PathMode,
    last_drawn: Vec<usize>,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W, mode: PathMode) -> Self {
        Self {
            out,
            mode,
            last_drawn: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn path_mode(&self) -> PathMode {
        self.mode
    }

    fn initialize(&mut self, bounds: Option<&Bounds>, frames: &[TrackFrame]) -> Result<()> {
        if let Some(b) = bounds {
            let c = b.center();
            writeln!(
                self.out,
                "viewport: {:.4},{:.4} .. {:.4},{:.4} (center {:.4},{:.4})",
                b.min_lat, b.min_lng, b.max_lat, b.max_lng, c.latitude, c.longitude
            )?;
        }
        for frame in frames {
            writeln!(self.out, "track {} [{}] {}", frame.track_id, frame.color, frame.label)?;
        }
        self.last_drawn = vec![usize::MAX; frames.len()];
        Ok(())
    }

    fn draw_frame(&mut self, frames: &[TrackFrame]) -> Result<()> {
        // Only print when some marker moved
        let indices: Vec<usize> = frames.iter().map(TrackFrame::sample_index).collect();
        if indices == self.last_drawn {
            return Ok(());
        }
        for frame in frames {
            let m = &frame.marker;
            match self.mode {
                PathMode::Flat => writeln!(
                    self.out,
                    "{:<20} {:>6}/{:<6} {:.5},{:.5}",
                    frame.label,
                    frame.position.sample_number,
                    frame.position.total_samples,
                    m.latitude,
                    m.longitude
                )?,
                PathMode::Extruded => writeln!(
                    self.out,
                    "{:<20} {:>6}/{:<6} {:.5},{:.5} {:>5.0}m",
                    frame.label,
                    frame.position.sample_number,
                    frame.position.total_samples,
                    m.latitude,
                    m.longitude,
                    m.altitude
                )?,
            }
        }
        self.last_drawn = indices;
        Ok(())
    }

    fn teardown(&mut self) {
        self.last_drawn.clear();
        let _ = self.out.flush();
    }
}

/// One-line clock read-out used by terminal drivers, e.g. `[1:23 / 12:00] 11.5% 2x`.
pub fn status_line(snapshot: &PlaybackSnapshot) -> String {
    format!(
        "[{}] {:.1}% {}x",
        snapshot.time_label(),
        snapshot.progress_percent(),
        snapshot.speed
    )
}
