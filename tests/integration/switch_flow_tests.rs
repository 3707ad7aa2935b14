//! End-to-end flows: `AppService` driving the real modem engine over the
//! scripted serial port with simulated time.

use gsmremote::app::events::{AppEvent, PowerCycleCause, RelayCause};
use gsmremote::app::ports::Clock;
use gsmremote::app::service::AppService;
use gsmremote::config::SystemConfig;
use gsmremote::console::ConsoleCommand;
use gsmremote::error::SafetyFault;
use gsmremote::scheduler::TaskId;

use super::mock_hw::Rig;

const MIN: u64 = 60_000;
const OWNER: &str = "+359888123456";

fn config() -> SystemConfig {
    let mut config = SystemConfig::default();
    config.authorized_number = heapless::String::try_from(OWNER).unwrap();
    config
}

fn clip(number: &str) -> String {
    format!("+CLIP: \"{number}\",145,\"\",0,\"\",0")
}

/// Boot the switch with a modem that answers `+CREG: 0,<creg>`.
fn boot(creg: u8) -> (AppService, Rig) {
    let config = config();
    let mut rig = Rig::new(&config);
    rig.serial.script("AT", "OK", 0);
    rig.serial.script("AT+CREG?", &format!("+CREG: 0,{creg}"), 20);
    rig.serial.script("AT+CSCLK=2", "OK", 0);

    let mut app = AppService::new(config, 0);
    app.start(&mut rig.modem, &mut rig.sink);
    for line in ["RDY", "+CFUN: 1", "+CPIN: READY", "Call Ready", "SMS Ready"] {
        rig.serial.emit_line(line);
    }
    (app, rig)
}

/// Main loop: one tick per `loop_interval_ms` until `until_ms`.
fn run_until(app: &mut AppService, rig: &mut Rig, until_ms: u64) {
    let step = u64::from(app.config().loop_interval_ms);
    while rig.clock.now_ms() < until_ms {
        app.tick(&mut rig.modem, &mut rig.board, &mut rig.sink);
        rig.clock.advance(step);
    }
}

fn watchdog_cycles(rig: &Rig) -> Vec<AppEvent> {
    rig.sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::ModemPowerCycled(PowerCycleCause::Watchdog(_))))
        .cloned()
        .collect()
}

#[test]
fn ready_banner_starts_network_polling() {
    let (mut app, mut rig) = boot(1);
    assert!(!app.is_task_enabled(TaskId::NetworkStatus));

    run_until(&mut app, &mut rig, 10_000);
    assert!(app.is_task_enabled(TaskId::NetworkStatus));
    assert_eq!(rig.serial.count("AT+CREG?"), 1);
    assert!(app.network_health().last_good_ms() > 0);
    assert!(app.is_task_enabled(TaskId::TimeConstraints));
}

#[test]
fn bad_registration_power_cycles_exactly_once() {
    let (mut app, mut rig) = boot(0);
    run_until(&mut app, &mut rig, 26 * MIN);

    let cycles = watchdog_cycles(&rig);
    assert_eq!(cycles.len(), 1, "{cycles:?}");
    match &cycles[0] {
        AppEvent::ModemPowerCycled(PowerCycleCause::Watchdog(faults)) => {
            assert!(faults.contains(SafetyFault::NetworkUnhealthy));
            assert!(!faults.contains(SafetyFault::ModemSilence));
        }
        other => panic!("unexpected {other:?}"),
    }
    // Boot pulse plus the watchdog pulse.
    assert_eq!(rig.power_pin.falling_edges(), 2);
    assert_eq!(rig.modem.power_key_pulses(), 2);
    assert!(!app.is_task_enabled(TaskId::NetworkStatus));
    assert!(app.network_health().last_good_ms() > 20 * MIN);

    // The restarted modem announces itself and polling resumes.
    rig.serial.emit_line("Call Ready");
    let now = rig.clock.now_ms();
    run_until(&mut app, &mut rig, now + 1_000);
    assert!(app.is_task_enabled(TaskId::NetworkStatus));
}

#[test]
fn good_registration_never_cycles() {
    let (mut app, mut rig) = boot(1);
    run_until(&mut app, &mut rig, 45 * MIN);
    assert!(watchdog_cycles(&rig).is_empty());
    assert_eq!(rig.power_pin.falling_edges(), 1);
    // One poll right after the banner, then one every five minutes.
    assert_eq!(rig.serial.count("AT+CREG?"), 9);
}

#[test]
fn authorized_call_switches_relay_then_max_on_time_cuts_it() {
    let (mut app, mut rig) = boot(1);
    run_until(&mut app, &mut rig, 2 * MIN);

    rig.serial.emit_line("RING");
    rig.serial.emit_line(&clip(OWNER));
    run_until(&mut app, &mut rig, 2 * MIN + 10_000);

    assert!(app.relay_on());
    assert!(rig.relay_pin.is_high());
    assert_eq!(rig.serial.count("ATH"), 3);
    assert!(rig.sink.events.contains(&AppEvent::RelaySwitched {
        on: true,
        cause: RelayCause::AuthorizedCall
    }));

    run_until(&mut app, &mut rig, 19 * MIN);
    assert!(!app.relay_on());
    assert!(!rig.relay_pin.is_high());
    assert!(rig.sink.events.contains(&AppEvent::RelaySwitched {
        on: false,
        cause: RelayCause::MaxOnDuration
    }));
    // The modem was healthy throughout.
    assert!(watchdog_cycles(&rig).is_empty());
}

#[test]
fn second_authorized_call_switches_relay_off() {
    let (mut app, mut rig) = boot(1);
    run_until(&mut app, &mut rig, 2 * MIN);

    rig.serial.emit_line(&clip(OWNER));
    run_until(&mut app, &mut rig, 2 * MIN + 10_000);
    assert!(app.relay_on());

    rig.serial.emit_line(&clip(OWNER));
    run_until(&mut app, &mut rig, 2 * MIN + 20_000);
    assert!(!app.relay_on());
    assert_eq!(rig.relay_pin.levels(), [false, true, false]);
    assert_eq!(rig.serial.count("ATH"), 6);
}

#[test]
fn over_voltage_cuts_relay() {
    let (mut app, mut rig) = boot(1);
    run_until(&mut app, &mut rig, 2 * MIN);
    rig.serial.emit_line(&clip(OWNER));
    run_until(&mut app, &mut rig, 2 * MIN + 10_000);
    assert!(app.relay_on());

    rig.board.supply_mv = 13_500;
    run_until(&mut app, &mut rig, 4 * MIN);
    assert!(!app.relay_on());
    assert!(rig.sink.events.contains(&AppEvent::RelaySwitched {
        on: false,
        cause: RelayCause::OverVoltage
    }));
}

#[test]
fn stranger_cannot_switch_relay() {
    let (mut app, mut rig) = boot(1);
    run_until(&mut app, &mut rig, 2 * MIN);
    rig.serial.emit_line(&clip("+359888000000"));
    run_until(&mut app, &mut rig, 2 * MIN + 10_000);

    assert!(!app.relay_on());
    assert_eq!(rig.relay_pin.levels(), [false]);
    assert_eq!(rig.serial.count("ATH"), 0);
    assert!(
        rig.sink
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::UnauthorizedCaller(n) if n.as_str() == "+359888000000"))
    );
}

#[test]
fn power_down_banner_restarts_modem() {
    let (mut app, mut rig) = boot(1);
    run_until(&mut app, &mut rig, 2 * MIN);
    assert!(app.is_task_enabled(TaskId::NetworkStatus));

    rig.serial.emit_line("NORMAL POWER DOWN");
    run_until(&mut app, &mut rig, 2 * MIN + 5_000);
    assert_eq!(rig.power_pin.falling_edges(), 2);
    assert!(!app.is_task_enabled(TaskId::NetworkStatus));
    assert!(
        rig.sink
            .events
            .contains(&AppEvent::ModemPowerCycled(PowerCycleCause::PowerDownBanner))
    );
}

#[test]
fn console_passthrough_and_power_toggle() {
    let (mut app, mut rig) = boot(1);
    run_until(&mut app, &mut rig, 10_000);

    for byte in [b'A', b'T', b'>'] {
        app.handle_console(
            ConsoleCommand::from_byte(byte),
            &mut rig.modem,
            &mut rig.board,
            &mut rig.sink,
        );
    }
    assert!(rig.serial.tx_bytes().ends_with(&[b'A', b'T', 0x1A]));

    app.handle_console(
        ConsoleCommand::from_byte(b'<'),
        &mut rig.modem,
        &mut rig.board,
        &mut rig.sink,
    );
    assert_eq!(rig.power_pin.falling_edges(), 2);
    assert!(!app.is_task_enabled(TaskId::NetworkStatus));
}
