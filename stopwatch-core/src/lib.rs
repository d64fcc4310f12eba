//! Pure stopwatch logic with no platform dependencies.
//! Testable on host, usable on Xous target.

mod app;
mod click;
mod config;

pub use app::{Clock, Scheduler, Screen, StopwatchApp, TickOutcome, TickToken};
pub use click::{ButtonEvent, ClickRecognizer};
pub use config::{
    StopwatchConfig, DEFAULT_LONG_PRESS_MS, DEFAULT_MAX_HOURS, DEFAULT_TICK_INTERVAL_MS,
};

pub const MS_PER_HOUR: u64 = 3_600_000;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum TimerState {
    Stopped,
    Running,
}

/// Accumulates running time across start/stop segments.
pub struct TimerCore {
    pub state: TimerState,
    accumulated_ms: u64,
    segment_start_ms: u64,
}

impl TimerCore {
    pub fn new() -> Self {
        Self {
            state: TimerState::Stopped,
            accumulated_ms: 0,
            segment_start_ms: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn start(&mut self, now_ms: u64) {
        if self.state == TimerState::Running {
            return;
        }
        self.segment_start_ms = now_ms;
        self.state = TimerState::Running;
    }

    pub fn stop(&mut self, now_ms: u64) {
        if self.state != TimerState::Running {
            return;
        }
        self.accumulated_ms += now_ms.saturating_sub(self.segment_start_ms);
        self.state = TimerState::Stopped;
    }

    pub fn reset(&mut self) {
        self.accumulated_ms = 0;
        self.segment_start_ms = 0;
        self.state = TimerState::Stopped;
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.state {
            TimerState::Running => {
                self.accumulated_ms + now_ms.saturating_sub(self.segment_start_ms)
            }
            TimerState::Stopped => self.accumulated_ms,
        }
    }
}

impl Default for TimerCore {
    fn default() -> Self {
        Self::new()
    }
}

/// The two text regions of the stopwatch face.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DisplayStrings {
    /// Large region: "MM:SS" below one hour, "HH:MM" from then on.
    pub primary: String,
    /// Small region: ".T" below one hour, ":SS" from then on.
    pub secondary: String,
}

impl DisplayStrings {
    pub fn zero() -> Self {
        format_elapsed(0)
    }
}

pub fn whole_hours(ms: u64) -> u64 {
    ms / MS_PER_HOUR
}

/// Format elapsed milliseconds for the watch face. Truncates, never rounds.
pub fn format_elapsed(ms: u64) -> DisplayStrings {
    let tenths = (ms / 100) % 10;
    let total_secs = ms / 1000;
    let s = total_secs % 60;
    let m = (total_secs / 60) % 60;
    let h = total_secs / 3600;

    if h < 1 {
        DisplayStrings {
            primary: format!("{:02}:{:02}", m, s),
            secondary: format!(".{}", tenths),
        }
    } else {
        DisplayStrings {
            primary: format!("{:02}:{:02}", h, m),
            secondary: format!(":{:02}", s),
        }
    }
}

/// Same as [`format_elapsed`] for a float seconds sample.
///
/// The sample is truncated to whole deciseconds, the finest unit on the face.
/// Negative and NaN samples format as zero.
pub fn format_elapsed_secs(secs: f64) -> DisplayStrings {
    let tenths = (secs.max(0.0) * 10.0).floor() as u64;
    format_elapsed(tenths * 100)
}
