//! Replay clock.
//!
//! Maps wall-clock time onto the shared track-time axis. While playing,
//! elapsed time is always recomputed from a fixed anchor pair
//! `(wall_anchor, track_anchor)`:
//!
//! ```text
//! elapsed = min(track_anchor + (now - wall_anchor) * speed, total)
//! ```
//!
//! Every discontinuous control action (resume, seek, speed change) moves the
//! anchors to the current instant, so no per-tick deltas are accumulated.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::ReplayConfig;

/// Source of wall-clock time in milliseconds.
pub trait TimeSource {
    fn now_ms(&self) -> f64;
}

/// Monotonic system time, measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven time for deterministic playback. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now_bits: Arc<AtomicU64>,
}

impl ManualTimeSource {
    /// Start at t = 0.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now_ms: f64) {
        self.now_bits.store(now_ms.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.set(self.now_ms() + delta_ms);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.now_bits.load(Ordering::SeqCst))
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// No session loaded
    Idle,
    /// Elapsed time fixed
    Paused,
    /// Elapsed time advancing with wall-clock time
    Playing,
}

/// Result of one animation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub elapsed_ms: f64,
    /// Playback reached the end on this tick and has paused
    pub finished: bool,
}

/// Read-only view for controls: time read-out, slider position, speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    pub elapsed_ms: f64,
    pub total_duration_ms: f64,
    pub speed: f64,
}

impl PlaybackSnapshot {
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Position as 0-100, or 0 when there is nothing to play.
    pub fn progress_percent(&self) -> f64 {
        if self.total_duration_ms <= 0.0 {
            return 0.0;
        }
        (self.elapsed_ms / self.total_duration_ms * 100.0).clamp(0.0, 100.0)
    }

    /// `elapsed / total` as `M:SS / M:SS`.
    pub fn time_label(&self) -> String {
        format!(
            "{} / {}",
            format_clock(self.elapsed_ms),
            format_clock(self.total_duration_ms)
        )
    }
}

/// Format milliseconds as `M:SS`. Minutes are not wrapped into hours.
///
/// ```
/// assert_eq!(glidetrax::format_clock(83_900.0), "1:23");
/// assert_eq!(glidetrax::format_clock(4_000_000.0), "66:40");
/// ```
pub fn format_clock(ms: f64) -> String {
    let total_secs = if ms.is_finite() && ms > 0.0 {
        (ms / 1000.0).floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Play/pause/seek/speed state machine over one session's duration.
#[derive(Debug)]
pub struct ReplayClock<T: TimeSource = SystemTimeSource> {
    source: T,
    status: PlaybackStatus,
    elapsed_ms: f64,
    total_duration_ms: f64,
    speed: f64,
    default_speed: f64,
    wall_anchor_ms: f64,
    track_anchor_ms: f64,
    config: ReplayConfig,
}

impl<T: TimeSource> ReplayClock<T> {
    /// Create an idle clock.
    pub fn new(source: T, config: &ReplayConfig) -> Self {
        let default_speed = config.clamp_speed(config.default_speed).unwrap_or(1.0);
        Self {
            source,
            status: PlaybackStatus::Idle,
            elapsed_ms: 0.0,
            total_duration_ms: 0.0,
            speed: default_speed,
            default_speed,
            wall_anchor_ms: 0.0,
            track_anchor_ms: 0.0,
            config: config.clone(),
        }
    }

    /// Attach a session's duration. The clock starts paused at 0.
    pub fn load(&mut self, total_duration_ms: i64) {
        self.total_duration_ms = total_duration_ms.max(0) as f64;
        self.elapsed_ms = 0.0;
        self.speed = self.default_speed;
        self.status = PlaybackStatus::Paused;
        debug!("[Clock] loaded, total {} ms", self.total_duration_ms);
    }

    /// Detach from the session.
    pub fn unload(&mut self) {
        self.status = PlaybackStatus::Idle;
        self.elapsed_ms = 0.0;
        self.total_duration_ms = 0.0;
    }

    /// Start or resume playback from the current position.
    ///
    /// Returns true if the clock transitioned to playing. No-op when idle,
    /// already playing, or when the session has zero duration.
    pub fn play(&mut self) -> bool {
        if self.status != PlaybackStatus::Paused || self.total_duration_ms <= 0.0 {
            return false;
        }
        self.anchor_at(self.elapsed_ms);
        self.status = PlaybackStatus::Playing;
        debug!("[Clock] play from {} ms at {}x", self.elapsed_ms, self.speed);
        true
    }

    /// Pause at the last computed elapsed time.
    ///
    /// Returns true if the clock was playing.
    pub fn pause(&mut self) -> bool {
        if self.status != PlaybackStatus::Playing {
            return false;
        }
        self.status = PlaybackStatus::Paused;
        debug!("[Clock] pause at {} ms", self.elapsed_ms);
        true
    }

    /// Pause and rewind to 0.
    pub fn reset(&mut self) {
        if self.status == PlaybackStatus::Idle {
            return;
        }
        self.status = PlaybackStatus::Paused;
        self.elapsed_ms = 0.0;
        debug!("[Clock] reset");
    }

    /// Jump to a percentage (clamped to 0-100) of the total duration.
    ///
    /// If playing, playback continues forward from the new position.
    pub fn seek(&mut self, percent: f64) {
        if self.status == PlaybackStatus::Idle {
            return;
        }
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        self.seek_to_ms(percent / 100.0 * self.total_duration_ms);
    }

    /// Jump to an absolute elapsed time (clamped to the session).
    pub fn seek_to_ms(&mut self, elapsed_ms: f64) {
        if self.status == PlaybackStatus::Idle {
            return;
        }
        let elapsed_ms = if elapsed_ms.is_nan() {
            0.0
        } else {
            elapsed_ms.clamp(0.0, self.total_duration_ms)
        };
        self.elapsed_ms = elapsed_ms;
        if self.status == PlaybackStatus::Playing {
            self.anchor_at(elapsed_ms);
        }
        debug!("[Clock] seek to {} ms", elapsed_ms);
    }

    /// Change the speed multiplier for future ticks.
    ///
    /// The request is clamped to the configured range; non-finite or
    /// non-positive values are ignored. Returns the speed now in effect.
    pub fn set_speed(&mut self, multiplier: f64) -> f64 {
        let Some(speed) = self.config.clamp_speed(multiplier) else {
            warn!("[Clock] ignoring invalid speed {}", multiplier);
            return self.speed;
        };
        if self.status == PlaybackStatus::Playing {
            // Bank the time played at the old speed before switching
            let current = self.compute_elapsed();
            self.elapsed_ms = current;
            self.anchor_at(current);
        }
        self.speed = speed;
        debug!("[Clock] speed {}x", speed);
        speed
    }

    /// Advance elapsed time from the anchors. Call once per animation frame.
    ///
    /// Reaching the end pauses playback; it does not loop.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != PlaybackStatus::Playing {
            return TickOutcome {
                elapsed_ms: self.elapsed_ms,
                finished: false,
            };
        }

        self.elapsed_ms = self.compute_elapsed();
        let finished = self.elapsed_ms >= self.total_duration_ms;
        if finished {
            self.elapsed_ms = self.total_duration_ms;
            self.status = PlaybackStatus::Paused;
            info!("[Clock] reached end at {} ms", self.total_duration_ms);
        }

        TickOutcome {
            elapsed_ms: self.elapsed_ms,
            finished,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Elapsed time as of the last tick or control action.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn total_duration_ms(&self) -> f64 {
        self.total_duration_ms
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            status: self.status,
            elapsed_ms: self.elapsed_ms,
            total_duration_ms: self.total_duration_ms,
            speed: self.speed,
        }
    }

    fn anchor_at(&mut self, track_ms: f64) {
        self.wall_anchor_ms = self.source.now_ms();
        self.track_anchor_ms = track_ms;
    }

    fn compute_elapsed(&self) -> f64 {
        let wall = (self.source.now_ms() - self.wall_anchor_ms).max(0.0);
        (self.track_anchor_ms + wall * self.speed)
            .min(self.total_duration_ms)
            .max(0.0)
    }
}
