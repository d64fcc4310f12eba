pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
pub const DEFAULT_LONG_PRESS_MS: u64 = 500;
pub const DEFAULT_MAX_HOURS: u64 = 99;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct StopwatchConfig {
    /// Delay between display refreshes while running.
    pub tick_interval_ms: u64,
    /// Minimum hold time for a press to count as a reset.
    pub long_press_ms: u64,
    /// Largest hour count the display can show. The timer stops past it.
    pub max_hours: u64,
}

impl Default for StopwatchConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            long_press_ms: DEFAULT_LONG_PRESS_MS,
            max_hours: DEFAULT_MAX_HOURS,
        }
    }
}
