use crate::{format_elapsed, whole_hours, ButtonEvent, DisplayStrings, StopwatchConfig, TimerCore};

/// Monotonic time source in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// One-shot callback scheduling. The scheduler hands `token` back to
/// [`StopwatchApp::tick`] once `delay_ms` has passed.
pub trait Scheduler {
    fn schedule(&mut self, delay_ms: u64, token: TickToken);
    fn cancel(&mut self, token: TickToken);
}

/// Two fixed text regions on the watch face.
pub trait Screen {
    fn show(&mut self, strings: &DisplayStrings);
}

/// Identifies a scheduled tick so a late one can be told apart from the live one.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TickToken(u32);

impl TickToken {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickOutcome {
    /// Display refreshed and the next tick scheduled.
    Refreshed,
    /// The hour cap was passed; the timer stopped with the last display kept.
    Saturated,
    /// Cancelled or superseded tick, nothing done.
    Stale,
}

/// Stopwatch application state, owned by the event loop and handed the
/// platform pieces it drives.
pub struct StopwatchApp<C, S, D> {
    config: StopwatchConfig,
    timer: TimerCore,
    clock: C,
    scheduler: S,
    screen: D,
    shown: DisplayStrings,
    pending: Option<TickToken>,
    next_token: u32,
}

impl<C: Clock, S: Scheduler, D: Screen> StopwatchApp<C, S, D> {
    pub fn new(config: StopwatchConfig, clock: C, scheduler: S, screen: D) -> Self {
        Self {
            config,
            timer: TimerCore::new(),
            clock,
            scheduler,
            screen,
            shown: DisplayStrings::zero(),
            pending: None,
            next_token: 0,
        }
    }

    pub fn config(&self) -> &StopwatchConfig {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.timer.elapsed_ms(self.clock.now_ms())
    }

    /// Strings currently on screen.
    pub fn display(&self) -> &DisplayStrings {
        &self.shown
    }

    pub fn has_pending_tick(&self) -> bool {
        self.pending.is_some()
    }

    pub fn handle_button(&mut self, event: ButtonEvent) {
        match event {
            ButtonEvent::Toggle => self.toggle(),
            ButtonEvent::Reset => self.reset(),
        }
    }

    pub fn toggle(&mut self) {
        if self.timer.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn start(&mut self) {
        if self.timer.is_running() {
            return;
        }
        let now = self.clock.now_ms();
        self.timer.start(now);
        self.schedule_tick();
    }

    pub fn stop(&mut self) {
        self.cancel_tick();
        if !self.timer.is_running() {
            return;
        }
        let now = self.clock.now_ms();
        self.timer.stop(now);
        let elapsed = self.timer.elapsed_ms(now);
        self.refresh(elapsed);
    }

    pub fn reset(&mut self) {
        self.cancel_tick();
        self.timer.reset();
        self.shown = DisplayStrings::zero();
        self.screen.show(&self.shown);
    }

    pub fn tick(&mut self, token: TickToken) -> TickOutcome {
        if self.pending != Some(token) {
            return TickOutcome::Stale;
        }
        self.pending = None;
        if !self.timer.is_running() {
            return TickOutcome::Stale;
        }

        let now = self.clock.now_ms();
        let elapsed = self.timer.elapsed_ms(now);
        if whole_hours(elapsed) > self.config.max_hours {
            self.timer.stop(now);
            return TickOutcome::Saturated;
        }

        self.schedule_tick();
        self.refresh(elapsed);
        TickOutcome::Refreshed
    }

    /// Post the current strings again, e.g. after the screen was invalidated.
    pub fn redraw(&mut self) {
        self.screen.show(&self.shown);
    }

    fn refresh(&mut self, elapsed_ms: u64) {
        self.shown = format_elapsed(elapsed_ms);
        self.screen.show(&self.shown);
    }

    fn schedule_tick(&mut self) {
        let token = TickToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.pending = Some(token);
        self.scheduler.schedule(self.config.tick_interval_ms, token);
    }

    fn cancel_tick(&mut self) {
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MS_PER_HOUR;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct FakeClock(Rc<Cell<u64>>);

    impl FakeClock {
        fn set(&self, ms: u64) {
            self.0.set(ms);
        }
    }

    impl Clock for FakeClock {
        fn now_ms(&self) -> u64 {
            self.0.get()
        }
    }

    #[derive(Clone, Copy, PartialEq, Debug)]
    enum Call {
        Schedule(u64, TickToken),
        Cancel(TickToken),
    }

    #[derive(Clone, Default)]
    struct FakeScheduler(Rc<RefCell<Vec<Call>>>);

    impl FakeScheduler {
        fn last_scheduled(&self) -> Option<TickToken> {
            self.0.borrow().iter().rev().find_map(|call| match call {
                Call::Schedule(_, token) => Some(*token),
                Call::Cancel(_) => None,
            })
        }

        fn calls(&self) -> Vec<Call> {
            self.0.borrow().clone()
        }
    }

    impl Scheduler for FakeScheduler {
        fn schedule(&mut self, delay_ms: u64, token: TickToken) {
            self.0.borrow_mut().push(Call::Schedule(delay_ms, token));
        }

        fn cancel(&mut self, token: TickToken) {
            self.0.borrow_mut().push(Call::Cancel(token));
        }
    }

    #[derive(Clone, Default)]
    struct FakeScreen(Rc<RefCell<Vec<DisplayStrings>>>);

    impl FakeScreen {
        fn last(&self) -> Option<DisplayStrings> {
            self.0.borrow().last().cloned()
        }

        fn frames(&self) -> usize {
            self.0.borrow().len()
        }
    }

    impl Screen for FakeScreen {
        fn show(&mut self, strings: &DisplayStrings) {
            self.0.borrow_mut().push(strings.clone());
        }
    }

    struct Harness {
        clock: FakeClock,
        scheduler: FakeScheduler,
        screen: FakeScreen,
        app: StopwatchApp<FakeClock, FakeScheduler, FakeScreen>,
    }

    impl Harness {
        fn new() -> Self {
            let clock = FakeClock::default();
            let scheduler = FakeScheduler::default();
            let screen = FakeScreen::default();
            let app = StopwatchApp::new(
                StopwatchConfig::default(),
                clock.clone(),
                scheduler.clone(),
                screen.clone(),
            );
            Self { clock, scheduler, screen, app }
        }

        /// Advance the clock and fire the outstanding tick.
        fn tick_at(&mut self, now_ms: u64) -> TickOutcome {
            self.clock.set(now_ms);
            let token = self.scheduler.last_scheduled().expect("no tick scheduled");
            self.app.tick(token)
        }
    }

    fn strings(primary: &str, secondary: &str) -> DisplayStrings {
        DisplayStrings {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
        }
    }

    #[test]
    fn test_start_schedules_tick() {
        let mut h = Harness::new();
        h.clock.set(1000);
        h.app.start();
        assert!(h.app.is_running());
        assert!(h.app.has_pending_tick());
        assert_eq!(h.scheduler.calls(), vec![Call::Schedule(100, TickToken(0))]);

        // Second start is a no-op
        h.app.start();
        assert_eq!(h.scheduler.calls().len(), 1);
    }

    #[test]
    fn test_tick_refreshes_and_reschedules() {
        let mut h = Harness::new();
        h.clock.set(1000);
        h.app.start();

        assert_eq!(h.tick_at(66_300), TickOutcome::Refreshed);
        assert_eq!(h.screen.last(), Some(strings("01:05", ".3")));
        assert_eq!(h.app.display(), &strings("01:05", ".3"));
        assert_eq!(h.scheduler.last_scheduled(), Some(TickToken(1)));
    }

    #[test]
    fn test_stop_cancels_and_freezes() {
        let mut h = Harness::new();
        h.app.start();
        h.tick_at(2_000);
        h.clock.set(2_050);
        h.app.stop();

        assert!(!h.app.is_running());
        assert!(!h.app.has_pending_tick());
        assert_eq!(h.scheduler.calls().last(), Some(&Call::Cancel(TickToken(1))));
        assert_eq!(h.screen.last(), Some(strings("00:02", ".0")));

        h.clock.set(90_000);
        assert_eq!(h.app.elapsed_ms(), 2_050);
    }

    #[test]
    fn test_stop_between_ticks_shows_frozen_value() {
        let mut h = Harness::new();
        h.app.start();
        h.tick_at(2_000);
        assert_eq!(h.screen.last(), Some(strings("00:02", ".0")));

        // Stop lands two deciseconds after the last tick
        h.clock.set(2_280);
        h.app.stop();
        assert_eq!(h.app.elapsed_ms(), 2_280);
        assert_eq!(h.screen.last(), Some(strings("00:02", ".2")));
        assert_eq!(h.app.display(), &format_elapsed(h.app.elapsed_ms()));
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let mut h = Harness::new();
        h.app.start();
        let token = h.scheduler.last_scheduled().unwrap();
        h.app.stop();
        let frames = h.screen.frames();

        h.clock.set(5_000);
        assert_eq!(h.app.tick(token), TickOutcome::Stale);
        assert!(!h.app.is_running());
        assert_eq!(h.screen.frames(), frames);

        // A restart hands out a fresh token; the old one stays dead
        h.app.start();
        assert_eq!(h.app.tick(token), TickOutcome::Stale);
        assert!(h.app.has_pending_tick());
    }

    #[test]
    fn test_start_stop_start_resumes() {
        let mut h = Harness::new();
        h.clock.set(10_000);
        h.app.start();
        h.tick_at(13_000);
        h.app.stop();

        h.clock.set(60_000);
        h.app.start();
        assert_eq!(h.app.elapsed_ms(), 3_000);
        assert_eq!(h.tick_at(61_500), TickOutcome::Refreshed);
        assert_eq!(h.screen.last(), Some(strings("00:04", ".5")));
    }

    #[test]
    fn test_toggle() {
        let mut h = Harness::new();
        h.app.handle_button(ButtonEvent::Toggle);
        assert!(h.app.is_running());
        h.app.handle_button(ButtonEvent::Toggle);
        assert!(!h.app.is_running());
        assert!(!h.app.has_pending_tick());
    }

    #[test]
    fn test_reset() {
        let mut h = Harness::new();
        h.app.start();
        h.tick_at(42_700);
        let token = h.scheduler.last_scheduled().unwrap();

        h.app.handle_button(ButtonEvent::Reset);
        assert!(!h.app.is_running());
        assert!(!h.app.has_pending_tick());
        assert_eq!(h.scheduler.calls().last(), Some(&Call::Cancel(token)));
        assert_eq!(h.app.elapsed_ms(), 0);
        assert_eq!(h.screen.last(), Some(strings("00:00", ".0")));

        // The tick queued before the reset must not revive the timer
        h.clock.set(43_000);
        let frames = h.screen.frames();
        assert_eq!(h.app.tick(token), TickOutcome::Stale);
        assert!(!h.app.is_running());
        assert_eq!(h.app.elapsed_ms(), 0);
        assert_eq!(h.screen.frames(), frames);

        // Reset while stopped also succeeds
        h.app.reset();
        assert_eq!(h.app.display(), &strings("00:00", ".0"));

        h.clock.set(50_000);
        h.app.start();
        assert_eq!(h.tick_at(51_000), TickOutcome::Refreshed);
        assert_eq!(h.screen.last(), Some(strings("00:01", ".0")));
    }

    #[test]
    fn test_hour_mode_display() {
        let mut h = Harness::new();
        h.app.start();
        assert_eq!(h.tick_at(3_725_000), TickOutcome::Refreshed);
        assert_eq!(h.screen.last(), Some(strings("01:02", ":05")));
    }

    #[test]
    fn test_saturates_past_max_hours() {
        let mut h = Harness::new();
        h.app.start();
        let last_valid = 99 * MS_PER_HOUR + 59 * 60_000 + 59_900;
        assert_eq!(h.tick_at(last_valid), TickOutcome::Refreshed);
        let frames = h.screen.frames();
        let calls = h.scheduler.calls().len();

        assert_eq!(h.tick_at(100 * MS_PER_HOUR), TickOutcome::Saturated);
        assert!(!h.app.is_running());
        assert!(!h.app.has_pending_tick());
        assert_eq!(h.scheduler.calls().len(), calls);
        assert_eq!(h.screen.frames(), frames);
        assert_eq!(h.app.display(), &strings("99:59", ":59"));

        // Redraw keeps the last valid face
        h.app.redraw();
        assert_eq!(h.screen.last(), Some(strings("99:59", ":59")));
    }

    #[test]
    fn test_tick_interval_from_config() {
        let clock = FakeClock::default();
        let scheduler = FakeScheduler::default();
        let config = StopwatchConfig {
            tick_interval_ms: 250,
            ..StopwatchConfig::default()
        };
        let mut app = StopwatchApp::new(config, clock, scheduler.clone(), FakeScreen::default());
        app.start();
        assert_eq!(scheduler.calls(), vec![Call::Schedule(250, TickToken(0))]);
        assert_eq!(app.config().tick_interval_ms, 250);
    }
}
