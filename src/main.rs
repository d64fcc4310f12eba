#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

mod platform;

use num_traits::{FromPrimitive, ToPrimitive};
use stopwatch_core::{
    ButtonEvent, ClickRecognizer, StopwatchApp, StopwatchConfig, TickOutcome, TickToken,
    DEFAULT_TICK_INTERVAL_MS,
};

use crate::platform::{LogScreen, PumpOp, PumpScheduler, TicktimerClock};

const SERVER_NAME: &str = "_Stopwatch_";

#[derive(Debug, num_derive::FromPrimitive, num_derive::ToPrimitive)]
enum AppOp {
    Redraw = 0,
    /// Short press, delivered already classified
    Toggle,
    /// Long press, delivered already classified
    Reset,
    /// Raw select button edges, classified here
    ButtonDown,
    ButtonUp,
    /// arg1 = tick token
    Tick,
    Quit,
}

type App = StopwatchApp<TicktimerClock, PumpScheduler, LogScreen>;

fn handle_button(app: &mut App, event: ButtonEvent) {
    app.handle_button(event);
    match event {
        ButtonEvent::Toggle if app.is_running() => {
            log::info!("started at {} ms", app.elapsed_ms());
        }
        ButtonEvent::Toggle => {
            log::info!("stopped at {} ms", app.elapsed_ms());
        }
        ButtonEvent::Reset => log::info!("reset"),
    }
}

fn pump_thread(pump_sid: xous::SID, main_conn: xous::CID) {
    let tt = ticktimer_server::Ticktimer::new().unwrap();
    let tick_op = AppOp::Tick.to_usize().unwrap();
    // (delay_ms, token) of the one outstanding tick
    let mut pending: Option<(u64, usize)> = None;

    loop {
        let envelope = match pending.take() {
            Some((delay_ms, token)) => {
                if delay_ms > 0 {
                    tt.sleep_ms(delay_ms as usize).ok();
                }
                // A control message that arrived during the sleep wins over the tick
                match xous::try_receive_message(pump_sid) {
                    Ok(Some(env)) => {
                        pending = Some((0, token));
                        Some(env)
                    }
                    _ => {
                        xous::send_message(
                            main_conn,
                            xous::Message::new_scalar(tick_op, token, 0, 0, 0),
                        ).ok();
                        None
                    }
                }
            }
            // Block-wait when nothing is scheduled
            None => xous::receive_message(pump_sid).ok(),
        };

        if let Some(env) = envelope {
            if let xous::Message::Scalar(scalar) = &env.body {
                match FromPrimitive::from_usize(env.body.id()) {
                    Some(PumpOp::Schedule) => {
                        let mut delay_ms = scalar.arg1 as u64;
                        if delay_ms == 0 { delay_ms = DEFAULT_TICK_INTERVAL_MS; }
                        pending = Some((delay_ms, scalar.arg2));
                    }
                    Some(PumpOp::Cancel) => {
                        if pending.map(|(_, token)| token == scalar.arg1).unwrap_or(false) {
                            pending = None;
                        }
                    }
                    Some(PumpOp::Quit) => break,
                    None => log::error!("unknown pump opcode: {}", env.body.id()),
                }
            }
        }
    }
}

fn main() -> ! {
    log_server::init_wait().unwrap();
    log::set_max_level(log::LevelFilter::Info);
    log::info!("Stopwatch PID is {}", xous::process::id());

    let xns = xous_names::XousNames::new().unwrap();
    let sid = xns.register_name(SERVER_NAME, None).expect("can't register server");
    let main_conn = xous::connect(sid).expect("can't connect to self");

    let pump_sid = xous::create_server().expect("can't create pump server");
    std::thread::spawn(move || {
        pump_thread(pump_sid, main_conn);
    });
    let pump_conn = xous::connect(pump_sid).expect("can't connect to pump");

    let config = StopwatchConfig::default();
    let mut click = ClickRecognizer::new(config.long_press_ms);
    let mut app = StopwatchApp::new(
        config,
        TicktimerClock::new(),
        PumpScheduler::new(pump_conn),
        LogScreen::new(),
    );
    app.redraw();

    loop {
        let msg = xous::receive_message(sid).unwrap();
        match FromPrimitive::from_usize(msg.body.id()) {
            Some(AppOp::Redraw) => {
                app.redraw();
            }
            Some(AppOp::Toggle) => handle_button(&mut app, ButtonEvent::Toggle),
            Some(AppOp::Reset) => handle_button(&mut app, ButtonEvent::Reset),
            Some(AppOp::ButtonDown) => {
                click.press(app.now_ms());
            }
            Some(AppOp::ButtonUp) => {
                if let Some(event) = click.release(app.now_ms()) {
                    handle_button(&mut app, event);
                }
            }
            Some(AppOp::Tick) => xous::msg_scalar_unpack!(msg, token, _, _, _, {
                match app.tick(TickToken::from_raw(token as u32)) {
                    TickOutcome::Refreshed => {}
                    TickOutcome::Saturated => {
                        log::info!("display limit of {} hours reached, stopped", app.config().max_hours);
                    }
                    TickOutcome::Stale => log::debug!("dropping stale tick {}", token),
                }
            }),
            Some(AppOp::Quit) => break,
            _ => log::error!("unknown opcode: {:?}", msg),
        }
    }

    // Clean up
    app.stop();
    platform::shutdown_pump(pump_conn);
    xns.unregister_server(sid).unwrap();
    unsafe { xous::destroy_server(sid).unwrap() };
    xous::terminate_process(0)
}
