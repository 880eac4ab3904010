//! Replay player: frame scheduling and session lifetime.
//!
//! The player owns a session, its clock and the renderer drawing it. It is
//! driven cooperatively: the host schedules one animation callback at a time
//! and only reschedules when [`ReplayPlayer::on_animation_frame`] asks it to.
//!
//! Every scheduled frame carries a [`FrameToken`]. Pausing, resetting or
//! ending the session invalidates outstanding tokens, so a stale callback
//! that still fires becomes a no-op instead of starting a second loop.
//!
//! Renderer resources are acquired in [`ReplayPlayer::start`] and released
//! exactly once, whether the session ends normally, setup fails, or the
//! player is dropped.

use std::time::Duration;

use log::{debug, info};

use crate::clock::{PlaybackSnapshot, ReplayClock, SystemTimeSource, TimeSource};
use crate::config::ReplayConfig;
use crate::error::{ReplayError, Result};
use crate::projector::{TrackFrame, positions, project_at, project_with_cursors};
use crate::render::Renderer;
use crate::resolver::{CurrentPosition, IndexCursor};
use crate::session::ReplaySession;

/// Identifies one scheduled animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameToken(u64);

/// What the host should do after a player call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    /// Schedule one animation frame and pass this token back.
    Schedule(FrameToken),
    /// Do not schedule anything.
    Idle,
}

/// Drives a replay session's clock, projector and renderer.
pub struct ReplayPlayer<R: Renderer, T: TimeSource = SystemTimeSource> {
    session: ReplaySession,
    clock: ReplayClock<T>,
    renderer: Option<R>,
    cursors: Vec<IndexCursor>,
    frames: Vec<TrackFrame>,
    frame_interval: Duration,
    generation: u64,
    pending: Option<FrameToken>,
}

impl<R: Renderer> ReplayPlayer<R, SystemTimeSource> {
    /// Start a session against the system clock.
    pub fn start_realtime(session: ReplaySession, renderer: R, config: &ReplayConfig) -> Result<Self> {
        Self::start(session, renderer, SystemTimeSource::new(), config)
    }
}

impl<R: Renderer, T: TimeSource> ReplayPlayer<R, T> {
    /// Start a session: initialize the renderer and draw the first frame.
    ///
    /// The clock starts paused at 0. If the renderer fails to initialize it
    /// is torn down before the error is returned.
    pub fn start(
        session: ReplaySession,
        mut renderer: R,
        source: T,
        config: &ReplayConfig,
    ) -> Result<Self> {
        let frames = project_at(&session, 0.0);
        if let Err(err) = renderer.initialize(session.bounds().as_ref(), &frames) {
            renderer.teardown();
            return Err(err);
        }

        let mut clock = ReplayClock::new(source, config);
        clock.load(session.total_duration_ms());

        let mut player = Self {
            cursors: vec![IndexCursor::new(); session.len()],
            session,
            clock,
            renderer: Some(renderer),
            frames,
            frame_interval: Duration::from_millis(config.frame_interval_ms.max(1)),
            generation: 0,
            pending: None,
        };
        // On failure the player drops here and tears the renderer down
        player.redraw()?;

        info!(
            "[Player] session started: {} tracks, {} ms",
            player.session.len(),
            player.session.total_duration_ms()
        );
        Ok(player)
    }

    /// Start or resume playback.
    pub fn play(&mut self) -> FrameRequest {
        if !self.clock.play() {
            return FrameRequest::Idle;
        }
        self.request_frame()
    }

    /// Pause playback and cancel the scheduled frame.
    pub fn pause(&mut self) -> Result<()> {
        if self.clock.pause() {
            self.cancel_frame();
            self.redraw()?;
        }
        Ok(())
    }

    /// Play if paused, pause if playing.
    pub fn toggle(&mut self) -> Result<FrameRequest> {
        if self.clock.is_playing() {
            self.pause()?;
            Ok(FrameRequest::Idle)
        } else {
            Ok(self.play())
        }
    }

    /// Pause and return every track to its first fix.
    pub fn reset(&mut self) -> Result<()> {
        self.clock.reset();
        self.cancel_frame();
        self.cursors.iter_mut().for_each(IndexCursor::reset);
        self.redraw()
    }

    /// Jump to a percentage of the session. Playback state is unchanged.
    pub fn seek(&mut self, percent: f64) -> Result<()> {
        self.clock.seek(percent);
        self.redraw()
    }

    /// Change playback speed, returning the speed now in effect.
    pub fn set_speed(&mut self, multiplier: f64) -> f64 {
        self.clock.set_speed(multiplier)
    }

    /// Animation callback.
    ///
    /// Advances the clock, projects and draws one frame. Returns `Schedule`
    /// while playback continues; `Idle` at the end of the session or when
    /// `token` is stale.
    pub fn on_animation_frame(&mut self, token: FrameToken) -> Result<FrameRequest> {
        if self.pending != Some(token) {
            debug!("[Player] ignoring stale frame {:?}", token);
            return Ok(FrameRequest::Idle);
        }
        self.pending = None;
        if !self.clock.is_playing() {
            return Ok(FrameRequest::Idle);
        }

        let outcome = self.clock.tick();
        if let Err(err) = self.redraw() {
            // No frame is outstanding now, so the clock must not stay playing
            self.clock.pause();
            return Err(err);
        }

        if outcome.finished {
            info!("[Player] playback finished at {} ms", outcome.elapsed_ms);
            return Ok(FrameRequest::Idle);
        }
        Ok(self.request_frame())
    }

    /// Play from the current position to the end of the session.
    ///
    /// `wait` is called before each frame with the player and the frame
    /// interval; a terminal host sleeps there and prints status.
    pub fn run_to_end<F>(&mut self, mut wait: F) -> Result<()>
    where
        F: FnMut(&Self, Duration),
    {
        let mut request = self.play();
        while let FrameRequest::Schedule(token) = request {
            wait(self, self.frame_interval);
            request = self.on_animation_frame(token)?;
        }
        Ok(())
    }

    /// Replace the session, releasing the old renderer resources first.
    pub fn load_session(&mut self, session: ReplaySession) -> Result<()> {
        self.cancel_frame();
        let mut renderer = self.renderer.take().ok_or_else(released)?;
        renderer.teardown();

        let frames = project_at(&session, 0.0);
        if let Err(err) = renderer.initialize(session.bounds().as_ref(), &frames) {
            renderer.teardown();
            self.clock.unload();
            return Err(err);
        }

        self.clock.load(session.total_duration_ms());
        self.cursors = vec![IndexCursor::new(); session.len()];
        self.session = session;
        self.frames = frames;
        self.renderer = Some(renderer);
        self.redraw()
    }

    /// End the session and hand back the torn-down renderer.
    pub fn into_renderer(mut self) -> Option<R> {
        self.shutdown();
        self.renderer.take()
    }

    pub fn session(&self) -> &ReplaySession {
        &self.session
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.clock.snapshot()
    }

    /// Frames last handed to the renderer.
    pub fn frames(&self) -> &[TrackFrame] {
        &self.frames
    }

    /// Per-track progress for the controls surface.
    pub fn positions(&self) -> Vec<CurrentPosition> {
        positions(&self.frames)
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    fn request_frame(&mut self) -> FrameRequest {
        if self.pending.is_some() {
            // Only one frame may be outstanding
            return FrameRequest::Idle;
        }
        self.generation += 1;
        let token = FrameToken(self.generation);
        self.pending = Some(token);
        FrameRequest::Schedule(token)
    }

    fn cancel_frame(&mut self) {
        self.pending = None;
    }

    fn redraw(&mut self) -> Result<()> {
        let frames = project_with_cursors(&self.session, self.clock.elapsed_ms(), &mut self.cursors);
        let renderer = self.renderer.as_mut().ok_or_else(released)?;
        renderer.draw_frame(&frames)?;
        self.frames = frames;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.cancel_frame();
        self.clock.unload();
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.teardown();
            info!("[Player] session ended, renderer released");
        }
    }
}

impl<R: Renderer, T: TimeSource> Drop for ReplayPlayer<R, T> {
    fn drop(&mut self) {
        if self.renderer.is_some() {
            self.shutdown();
            self.renderer = None;
        }
    }
}

fn released() -> ReplayError {
    ReplayError::Renderer("renderer already released".to_string())
}
