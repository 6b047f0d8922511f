// Replay state: the loaded session, its playback clock and the view transform

pub mod clock;
pub mod hud;
pub mod leaderboard;
pub mod transform;

use std::time::Instant;

use egui::Rect;
use log::{debug, info};

use crate::session::{Frame, Session, Track};

pub use clock::{BASE_FRAME_RATE, DEFAULT_SPEED_INDEX, PlaybackClock, SPEEDS};
pub use leaderboard::{Standing, standings};
pub use transform::{ViewLayout, ViewTransform};

/// Everything the renderer reads on a display refresh.
///
/// Owned by the UI and mutated only from the UI thread.
#[derive(Debug, Clone)]
pub struct ReplayState {
    session: Option<Session>,
    clock: PlaybackClock,
    layout: ViewLayout,
    viewport: Option<Rect>,
    transform: Option<ViewTransform>,
    // set when something changed that playback alone would not repaint
    dirty: bool,
}

impl Default for ReplayState {
    fn default() -> Self {
        Self::new(ViewLayout::default(), PlaybackClock::default())
    }
}

impl ReplayState {
    pub fn new(layout: ViewLayout, clock: PlaybackClock) -> Self {
        Self {
            session: None,
            clock,
            layout,
            viewport: None,
            transform: None,
            dirty: true,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn transform(&self) -> Option<&ViewTransform> {
        self.transform.as_ref()
    }

    pub fn layout(&self) -> &ViewLayout {
        &self.layout
    }

    pub fn frame_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.frames.len())
    }

    /// Replaces the current session, rewinds and resumes playback.
    pub fn load_session(&mut self, session: Session) {
        info!(
            "Replaying {} ({} frames, {} laps)",
            session.session_info.event_name,
            session.frames.len(),
            session.total_laps()
        );
        self.session = Some(session);
        self.clock.restart();
        self.update_transform();
        self.dirty = true;
    }

    /// Records the canvas rectangle, refitting the track when it changed.
    ///
    /// Returns true when the transform was recomputed.
    pub fn set_viewport(&mut self, viewport: Rect) -> bool {
        if self.viewport == Some(viewport) {
            return false;
        }
        debug!("Viewport changed to {:?}", viewport);
        self.viewport = Some(viewport);
        self.update_transform();
        self.dirty = true;
        true
    }

    // without track geometry the cars are fitted on their own extent
    fn update_transform(&mut self) {
        self.transform = match (&self.session, self.viewport) {
            (Some(session), Some(viewport)) => session
                .track
                .as_ref()
                .map(Track::bounds)
                .or_else(|| session.car_bounds())
                .map(|bounds| {
                    ViewTransform::fit(&bounds, session.circuit_rotation(), viewport, &self.layout)
                }),
            _ => None,
        };
    }

    /// Advances playback to `now`. Does nothing without frames.
    pub fn tick(&mut self, now: Instant) {
        let frame_count = self.frame_count();
        if frame_count == 0 {
            return;
        }
        self.clock.tick(now, frame_count);
    }

    /// Drops the tick baseline after the UI thread was blocked.
    pub fn resync_clock(&mut self) {
        self.clock.reset_baseline();
    }

    pub fn toggle_playback(&mut self) {
        self.clock.toggle();
        self.dirty = true;
    }

    pub fn speed_up(&mut self) {
        self.clock.speed_up();
        self.dirty = true;
    }

    pub fn speed_down(&mut self) {
        self.clock.speed_down();
        self.dirty = true;
    }

    pub fn seek(&mut self, frame_index: f64) {
        let frame_count = self.frame_count();
        self.clock.seek(frame_index, frame_count);
        self.dirty = true;
    }

    pub fn current_frame_index(&self) -> Option<usize> {
        self.clock.current_frame(self.frame_count())
    }

    /// The frame to draw: the fractional playback index floored
    pub fn current_frame(&self) -> Option<&Frame> {
        let session = self.session.as_ref()?;
        let index = self.clock.current_frame(session.frames.len())?;
        session.frames.get(index)
    }

    /// `HH:MM:SS  Lap L/Total` for the current frame
    pub fn hud_text(&self) -> Option<String> {
        let session = self.session.as_ref()?;
        let frame = self.current_frame()?;
        Some(hud::hud_text(frame.t, frame.lap, session.total_laps()))
    }

    pub fn standings(&self) -> Vec<Standing> {
        match (self.session.as_ref(), self.current_frame()) {
            (Some(session), Some(frame)) => standings(frame, session),
            _ => Vec::new(),
        }
    }

    /// Whether the next display refresh would draw something new.
    ///
    /// Clears the pending one-shot repaint flag.
    pub fn take_needs_repaint(&mut self) -> bool {
        let moving = self.clock.is_playing() && !self.clock.is_at_end(self.frame_count());
        let dirty = std::mem::take(&mut self.dirty);
        moving || dirty
    }
}
