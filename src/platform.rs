use num_traits::ToPrimitive;
use stopwatch_core::{Clock, DisplayStrings, Scheduler, Screen, TickToken};

/// Control opcodes understood by the pump thread.
#[derive(Debug, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub enum PumpOp {
    /// arg1 = delay in ms, arg2 = tick token
    Schedule = 0,
    /// arg1 = tick token
    Cancel,
    Quit,
}

pub struct TicktimerClock {
    tt: ticktimer_server::Ticktimer,
}

impl TicktimerClock {
    pub fn new() -> Self {
        let tt = ticktimer_server::Ticktimer::new().expect("can't connect to ticktimer");
        Self { tt }
    }
}

impl Default for TicktimerClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TicktimerClock {
    fn now_ms(&self) -> u64 {
        self.tt.elapsed_ms()
    }
}

/// Hands one-shot ticks to the pump thread.
pub struct PumpScheduler {
    pump_conn: xous::CID,
}

impl PumpScheduler {
    pub fn new(pump_conn: xous::CID) -> Self {
        Self { pump_conn }
    }
}

impl Scheduler for PumpScheduler {
    fn schedule(&mut self, delay_ms: u64, token: TickToken) {
        xous::send_message(
            self.pump_conn,
            xous::Message::new_scalar(
                PumpOp::Schedule.to_usize().unwrap(),
                delay_ms as usize,
                token.raw() as usize,
                0,
                0,
            ),
        ).ok();
    }

    fn cancel(&mut self, token: TickToken) {
        xous::send_message(
            self.pump_conn,
            xous::Message::new_scalar(PumpOp::Cancel.to_usize().unwrap(), token.raw() as usize, 0, 0, 0),
        ).ok();
    }
}

pub fn shutdown_pump(pump_conn: xous::CID) {
    xous::send_message(
        pump_conn,
        xous::Message::new_scalar(PumpOp::Quit.to_usize().unwrap(), 0, 0, 0, 0),
    ).ok();
}

/// Renders the watch face into the log. Only a change of the large region is
/// logged at info so a running stopwatch produces one line per second.
pub struct LogScreen {
    last_primary: String,
}

impl LogScreen {
    pub fn new() -> Self {
        Self {
            last_primary: String::new(),
        }
    }
}

impl Default for LogScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for LogScreen {
    fn show(&mut self, strings: &DisplayStrings) {
        if strings.primary != self.last_primary {
            log::info!("[{}]{}", strings.primary, strings.secondary);
            self.last_primary.clone_from(&strings.primary);
        } else {
            log::debug!("[{}]{}", strings.primary, strings.secondary);
        }
    }
}
