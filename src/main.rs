//! GSM Remote Switch Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Modem<UartTransport>  HardwareAdapter   LogEventSink  Esp32Time│
//! │  (ModemPort)           (Relay+Supply)    (EventSink)   (Clock)  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Scheduler · Dispatch · Calls · Time constraints        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Debug console (UART0) ──▶ AppService::handle_console          │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, anyhow};
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{AnyIOPin, PinDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_svc::hal::units::Hertz;
use log::{info, warn};

use gsmremote::adapters::hardware::HardwareAdapter;
use gsmremote::adapters::log_sink::LogEventSink;
use gsmremote::adapters::time::Esp32TimeAdapter;
use gsmremote::adapters::uart::UartTransport;
use gsmremote::app::ports::Clock;
use gsmremote::app::service::AppService;
use gsmremote::config::SystemConfig;
use gsmremote::console::ConsoleCommand;
use gsmremote::drivers::hw_init;
use gsmremote::drivers::power_key::PowerKey;
use gsmremote::drivers::relay::RelayDriver;
use gsmremote::modem::{Modem, ModemTiming};
use gsmremote::pins;
use gsmremote::sensors::battery::{BatterySensor, VoltageDivider};

const CONSOLE_BAUD: u32 = 115_200;

/// Defaults, or the JSON baked in through `GSM_REMOTE_CONFIG_JSON`.
fn load_config() -> gsmremote::error::Result<SystemConfig> {
    let config = match option_env!("GSM_REMOTE_CONFIG_JSON") {
        Some(json) => SystemConfig::from_json(json)?,
        None => SystemConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  GSMRemote v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config()?;
    if config.authorized_number.is_empty() {
        warn!("No authorized number configured; every call will be rejected");
    }

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;
    let peripherals = Peripherals::take()?;
    let io = peripherals.pins;

    const _: () = assert!(pins::MODEM_TX_GPIO == 17 && pins::MODEM_RX_GPIO == 18);
    const _: () = assert!(pins::CONSOLE_TX_GPIO == 43 && pins::CONSOLE_RX_GPIO == 44);
    const _: () = assert!(pins::MODEM_PWRKEY_GPIO == 2);
    const _: () = assert!(pins::RELAY_GPIO == 8);

    let modem_uart = UartDriver::new(
        peripherals.uart1,
        io.gpio17,
        io.gpio18,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(config.modem_baud)),
    )?;
    let console_uart = UartDriver::new(
        peripherals.uart0,
        io.gpio43,
        io.gpio44,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(CONSOLE_BAUD)),
    )?;

    let power_key = PowerKey::new(PinDriver::output(io.gpio2)?)
        .map_err(|e| anyhow!("power key: {e}"))?;
    let relay = RelayDriver::new(PinDriver::output(io.gpio8)?)
        .map_err(|e| anyhow!("relay: {e}"))?;
    let battery = BatterySensor::new(pins::VBAT_ADC1_CHANNEL, VoltageDivider::from_config(&config));
    info!("Supply sense on ADC1 CH{}", battery.channel());
    let mut hw = HardwareAdapter::new(relay, battery);

    // ── 4. Modem engine and application core ──────────────────
    let clock = Esp32TimeAdapter::new();
    let mut modem = Modem::new(
        UartTransport::new(modem_uart),
        power_key,
        FreeRtos,
        clock,
        ModemTiming::from_config(&config),
    );
    let mut console = UartTransport::new(console_uart);
    let mut sink = LogEventSink::new();

    let loop_interval_ms = config.loop_interval_ms;
    let mut app = AppService::new(config, clock.now_ms());
    app.start(&mut modem, &mut sink);

    info!("System ready. Entering main loop.");

    // ── 5. Main loop ──────────────────────────────────────────
    loop {
        app.tick(&mut modem, &mut hw, &mut sink);

        while let Some(byte) = console.read_byte() {
            app.handle_console(ConsoleCommand::from_byte(byte), &mut modem, &mut hw, &mut sink);
        }

        FreeRtos::delay_ms(loop_interval_ms);
    }
}
