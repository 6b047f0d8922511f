use std::time::Instant;

/// Playback speed multipliers the user can step through
pub const SPEEDS: [f64; 7] = [0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0];
/// Index of 1x in [`SPEEDS`]
pub const DEFAULT_SPEED_INDEX: usize = 2;
/// Rate at which frames were sampled by the backend, frames per second
pub const BASE_FRAME_RATE: f64 = 25.0;

/// Advances a fractional frame index with wall clock time.
///
/// The clock is either playing or paused and only [`PlaybackClock::toggle`]
/// switches between the two. While playing every tick moves the index by
/// `speed * BASE_FRAME_RATE * dt`, clamped to the available frames. Reaching
/// either end holds the index there without pausing.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    frame_index: f64,
    playing: bool,
    speed_index: usize,
    last_tick: Option<Instant>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            frame_index: 0.0,
            playing: true,
            speed_index: DEFAULT_SPEED_INDEX,
            last_tick: None,
        }
    }
}

impl PlaybackClock {
    pub fn with_speed_index(speed_index: usize) -> Self {
        Self {
            speed_index: speed_index.min(SPEEDS.len() - 1),
            ..Default::default()
        }
    }

    pub fn frame_index(&self) -> f64 {
        self.frame_index
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn speed_index(&self) -> usize {
        self.speed_index
    }

    pub fn speed(&self) -> f64 {
        SPEEDS[self.speed_index]
    }

    /// Label shown next to the speed steppers, e.g. `0.25×` or `2×`
    pub fn speed_label(&self) -> String {
        format!("{}×", self.speed())
    }

    /// Index of the frame to display, the fractional index floored
    pub fn current_frame(&self, frame_count: usize) -> Option<usize> {
        if frame_count == 0 {
            return None;
        }
        Some((self.frame_index.floor() as usize).min(frame_count - 1))
    }

    /// Start over for a freshly loaded session: rewind, play, drop the tick baseline.
    pub fn restart(&mut self) {
        self.frame_index = 0.0;
        self.playing = true;
        self.last_tick = None;
    }

    pub fn toggle(&mut self) {
        self.playing = !self.playing;
        // the paused interval must not count as elapsed playback time
        self.last_tick = None;
    }

    /// Forgets the last tick so the next one only records a new baseline.
    pub fn reset_baseline(&mut self) {
        self.last_tick = None;
    }

    pub fn speed_up(&mut self) {
        if self.speed_index < SPEEDS.len() - 1 {
            self.speed_index += 1;
        }
    }

    pub fn speed_down(&mut self) {
        self.speed_index = self.speed_index.saturating_sub(1);
    }

    /// Called once per display refresh.
    ///
    /// The first tick after a restart, a resume or while paused only records
    /// the baseline timestamp.
    pub fn tick(&mut self, now: Instant, frame_count: usize) {
        if !self.playing {
            self.last_tick = None;
            return;
        }

        if let Some(last_tick) = self.last_tick {
            let dt = now.saturating_duration_since(last_tick).as_secs_f64();
            self.advance(dt, frame_count);
        }
        self.last_tick = Some(now);
    }

    /// Moves the index by `dt` seconds of playback at the current speed.
    pub fn advance(&mut self, dt: f64, frame_count: usize) {
        if !self.playing {
            return;
        }
        let next = self.frame_index + self.speed() * BASE_FRAME_RATE * dt;
        self.frame_index = clamp_index(next, frame_count);
    }

    /// Jumps to a given position, clamped to the available frames.
    pub fn seek(&mut self, frame_index: f64, frame_count: usize) {
        self.frame_index = clamp_index(frame_index, frame_count);
    }

    /// True when the index sits on the last frame and cannot advance further
    pub fn is_at_end(&self, frame_count: usize) -> bool {
        frame_count == 0 || self.frame_index >= (frame_count - 1) as f64
    }
}

fn clamp_index(index: f64, frame_count: usize) -> f64 {
    let max = frame_count.saturating_sub(1) as f64;
    if index.is_nan() {
        return 0.0;
    }
    index.clamp(0.0, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::Duration;

    #[test]
    fn test_one_tick_at_normal_speed_advances_one_frame() {
        let mut clock = PlaybackClock::default();
        let start = Instant::now();

        clock.tick(start, 100);
        assert_eq!(clock.frame_index(), 0.0);

        clock.tick(start + Duration::from_millis(40), 100);
        assert!((clock.frame_index() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_index_holds_at_last_frame_and_keeps_playing() {
        let mut clock = PlaybackClock::default();
        clock.advance(1000.0, 10);

        assert_eq!(clock.frame_index(), 9.0);
        assert!(clock.is_playing());
        assert!(clock.is_at_end(10));
        assert_eq!(clock.current_frame(10), Some(9));
    }

    #[test]
    fn test_paused_clock_does_not_move() {
        let mut clock = PlaybackClock::default();
        clock.toggle();
        let start = Instant::now();

        clock.tick(start, 100);
        clock.tick(start + Duration::from_secs(5), 100);
        clock.advance(3.0, 100);

        assert_eq!(clock.frame_index(), 0.0);
        assert!(!clock.is_playing());
    }

    #[test]
    fn test_restart_rewinds_and_resumes() {
        let mut clock = PlaybackClock::default();
        clock.advance(2.0, 100);
        clock.toggle();

        clock.restart();

        assert_eq!(clock.frame_index(), 0.0);
        assert!(clock.is_playing());
    }

    #[test]
    fn test_speed_steps_clamp_at_both_ends() {
        let mut clock = PlaybackClock::default();
        for _ in 0..20 {
            clock.speed_up();
        }
        assert_eq!(clock.speed(), 16.0);
        assert_eq!(clock.speed_label(), "16×");

        for _ in 0..20 {
            clock.speed_down();
        }
        assert_eq!(clock.speed(), 0.25);
        assert_eq!(clock.speed_label(), "0.25×");
    }

    #[test]
    fn test_empty_session_has_no_current_frame() {
        let mut clock = PlaybackClock::default();
        clock.advance(1.0, 0);

        assert_eq!(clock.frame_index(), 0.0);
        assert_eq!(clock.current_frame(0), None);
    }

    #[test]
    fn test_seek_is_clamped() {
        let mut clock = PlaybackClock::default();

        clock.seek(-5.0, 50);
        assert_eq!(clock.frame_index(), 0.0);

        clock.seek(70.0, 50);
        assert_eq!(clock.frame_index(), 49.0);

        clock.seek(12.7, 50);
        assert_eq!(clock.current_frame(50), Some(12));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_speed_index_stays_in_bounds(steps in prop::collection::vec(any::<bool>(), 0..64)) {
            let mut clock = PlaybackClock::default();
            for up in steps {
                if up { clock.speed_up() } else { clock.speed_down() }
                prop_assert!(clock.speed_index() < SPEEDS.len());
                prop_assert!(SPEEDS.contains(&clock.speed()));
            }
        }

        #[test]
        fn prop_advance_is_clamped_linear_step(
            start in 0.0f64..500.0,
            dt in 0.0f64..10.0,
            speed_steps in 0usize..7,
            frame_count in 1usize..1000,
        ) {
            let mut clock = PlaybackClock::with_speed_index(0);
            for _ in 0..speed_steps {
                clock.speed_up();
            }
            clock.seek(start, frame_count);
            let old = clock.frame_index();

            clock.advance(dt, frame_count);

            let expected = (old + clock.speed() * BASE_FRAME_RATE * dt)
                .clamp(0.0, (frame_count - 1) as f64);
            prop_assert!((clock.frame_index() - expected).abs() < 1e-9);
        }

        #[test]
        fn prop_pause_resume_has_no_jump(paused_ms in 0u64..60_000, played_ms in 0u64..1_000) {
            let mut clock = PlaybackClock::default();
            let start = Instant::now();
            clock.tick(start, 100_000);
            clock.toggle();
            clock.tick(start + Duration::from_millis(paused_ms), 100_000);
            let before_resume = clock.frame_index();

            clock.toggle();
            let resume_at = start + Duration::from_millis(paused_ms + 1);
            clock.tick(resume_at, 100_000);
            prop_assert_eq!(clock.frame_index(), before_resume);

            clock.tick(resume_at + Duration::from_millis(played_ms), 100_000);
            let expected = before_resume + BASE_FRAME_RATE * played_ms as f64 / 1000.0;
            prop_assert!((clock.frame_index() - expected).abs() < 1e-6);
        }
    }
}
