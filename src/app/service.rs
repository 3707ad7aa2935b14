//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the shared switch state, the scheduler, the
//! unsolicited handler, the call controller and the time-constraint
//! sweep.  All I/O flows through port traits injected at call sites, so
//! the whole service runs against fakes on the host.
//!
//! ```text
//!   ModemPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          AppService           │
//!   RelayPort ◀── │ Scheduler · Dispatch · Sweep  │
//!  SupplyPort ──▶ └──────────────────────────────┘
//! ```

use log::{error, info, warn};

use crate::call::{CallController, CallOutcome};
use crate::config::SystemConfig;
use crate::console::ConsoleCommand;
use crate::error::{FaultSet, SafetyFault};
use crate::modem::at::IncomingCaller;
use crate::modem::framer::Line;
use crate::network::{self, NetworkReport};
use crate::safety::{SweepInputs, TimeConstraints};
use crate::scheduler::{Scheduler, TaskId};

use super::dispatch::{Reaction, RemoteSwitchHandler, UnsolicitedHandler};
use super::events::{AppEvent, PowerCycleCause, RelayCause};
use super::ports::{EventSink, ModemPort, RelayPort, SupplyPort};
use super::state::{NetworkHealth, SwitchState};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService<H = RemoteSwitchHandler> {
    config: SystemConfig,
    state: SwitchState,
    scheduler: Scheduler,
    handler: H,
    calls: CallController,
    constraints: TimeConstraints,
}

impl AppService<RemoteSwitchHandler> {
    /// Construct the service with the stock unsolicited handler.
    ///
    /// `now_ms` seeds the network-health stamp, so a modem that never
    /// registers trips the sweep `bad_network_hold_ms` after boot.
    pub fn new(config: SystemConfig, now_ms: u64) -> Self {
        Self::with_handler(config, now_ms, RemoteSwitchHandler)
    }
}

impl<H: UnsolicitedHandler> AppService<H> {
    pub fn with_handler(config: SystemConfig, now_ms: u64, handler: H) -> Self {
        let mut scheduler = Scheduler::new();
        // Network polling waits for the modem's ready banner.
        scheduler.add(
            TaskId::NetworkStatus,
            "network-status",
            config.network_check_interval_ms,
            false,
        );
        scheduler.add(
            TaskId::TimeConstraints,
            "time-constraints",
            config.watchdog_interval_ms,
            true,
        );

        Self {
            calls: CallController::new(&config),
            constraints: TimeConstraints::new(&config),
            state: SwitchState::new(now_ms),
            scheduler,
            handler,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Power the modem on.  It answers with its boot banners, the last
    /// of which enables network polling.
    pub fn start(&mut self, modem: &mut impl ModemPort, sink: &mut impl EventSink) {
        self.power_cycle(modem, PowerCycleCause::Boot, sink);
        sink.emit(&AppEvent::Started);
        info!("AppService started");
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One scheduler pass: every due task in registration order, then at
    /// most one unsolicited line.
    ///
    /// The `hw` parameter satisfies **both** [`RelayPort`] and
    /// [`SupplyPort`]; this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        modem: &mut impl ModemPort,
        hw: &mut (impl RelayPort + SupplyPort),
        sink: &mut impl EventSink,
    ) {
        for id in self.scheduler.task_ids() {
            // Each task sees the time after its predecessors ran.
            if !self.scheduler.take_due(id, modem.now_ms()) {
                continue;
            }
            match id {
                TaskId::NetworkStatus => {
                    self.check_network(modem, sink);
                }
                TaskId::TimeConstraints => {
                    self.sweep(modem, hw, sink);
                }
            }
        }

        match modem.poll_line() {
            Ok(Some(line)) => self.dispatch_line(&line, modem, hw, sink),
            Ok(None) => {}
            Err(e) => warn!("Modem: read failed: {}", e),
        }
    }

    /// Run the registration poll and report it.
    pub fn check_network(
        &mut self,
        modem: &mut impl ModemPort,
        sink: &mut impl EventSink,
    ) -> NetworkReport {
        let report = network::check_network_status(
            modem,
            &mut self.state.network,
            self.config.command_timeout_ms,
        );
        sink.emit(&AppEvent::NetworkStatus {
            registration: report.registration,
            healthy: report.is_registered(),
        });
        report
    }

    /// Evaluate every time constraint once and act on the result.
    pub fn sweep(
        &mut self,
        modem: &mut impl ModemPort,
        hw: &mut (impl RelayPort + SupplyPort),
        sink: &mut impl EventSink,
    ) -> FaultSet {
        let now = modem.now_ms();
        let relay_on_for_ms = self.state.relay.on_for_ms(now);
        // The cutoff only matters while the relay is closed.
        let supply_mv = match relay_on_for_ms {
            Some(_) => match hw.supply_millivolts() {
                Ok(mv) => Some(mv),
                Err(e) => {
                    warn!("Supply voltage read failed, skipping check: {}", e);
                    None
                }
            },
            None => None,
        };

        let inputs = SweepInputs {
            since_network_ok_ms: self.state.network.elapsed_ms(now),
            since_modem_activity_ms: modem.millis_since_activity(),
            relay_on_for_ms,
            supply_mv,
        };
        let faults = self.constraints.evaluate(&inputs);
        if faults.is_empty() {
            return faults;
        }
        sink.emit(&AppEvent::FaultDetected(faults));

        if faults.requires_relay_off() {
            let cause = if faults.contains(SafetyFault::MaxOnDuration) {
                RelayCause::MaxOnDuration
            } else {
                RelayCause::OverVoltage
            };
            self.switch_relay(false, cause, hw, now, sink);
        }

        if faults.requires_modem_restart() {
            self.power_cycle(modem, PowerCycleCause::Watchdog(faults), sink);
            self.set_task(TaskId::NetworkStatus, false, sink);
            // Give the restarted modem a full hold period to register.
            self.state.network.mark_good(modem.now_ms());
        }
        faults
    }

    /// Route one unsolicited line through the handler and carry out its
    /// reactions in order.
    pub fn dispatch_line(
        &mut self,
        line: &Line,
        modem: &mut impl ModemPort,
        hw: &mut impl RelayPort,
        sink: &mut impl EventSink,
    ) {
        for reaction in self.handler.on_line(line) {
            match reaction {
                Reaction::EnableTask(id) => self.set_task(id, true, sink),
                Reaction::DisableTask(id) => self.set_task(id, false, sink),
                Reaction::PowerCycleModem => {
                    self.power_cycle(modem, PowerCycleCause::PowerDownBanner, sink)
                }
                Reaction::IncomingCall(caller) => self.incoming_call(&caller, modem, hw, sink),
                Reaction::Unhandled => {
                    info!("Unhandled: {}", line);
                    sink.emit(&AppEvent::UnhandledLine(line.clone()));
                }
            }
        }
    }

    // ── Console ───────────────────────────────────────────────

    /// Execute one operator console command.
    pub fn handle_console(
        &mut self,
        cmd: ConsoleCommand,
        modem: &mut impl ModemPort,
        hw: &mut impl SupplyPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            ConsoleCommand::ToggleModemPower => {
                self.power_cycle(modem, PowerCycleCause::Console, sink);
                self.set_task(TaskId::NetworkStatus, false, sink);
            }
            ConsoleCommand::SendCtrlZ => self.forward(modem, crate::console::CTRL_Z),
            ConsoleCommand::CheckNetwork => {
                self.check_network(modem, sink);
            }
            ConsoleCommand::PrintSupplyVoltage => match hw.supply_millivolts() {
                Ok(mv) => info!("Supply voltage: {} mV", mv),
                Err(e) => warn!("Supply voltage read failed: {}", e),
            },
            ConsoleCommand::Forward(byte) => self.forward(modem, byte),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn relay_on(&self) -> bool {
        self.state.relay.is_on()
    }

    pub fn network_health(&self) -> NetworkHealth {
        self.state.network
    }

    pub fn is_task_enabled(&self, id: TaskId) -> bool {
        self.scheduler.is_enabled(id)
    }

    /// Snapshot of the shared switch state.
    pub fn state(&self) -> SwitchState {
        self.state
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn incoming_call(
        &mut self,
        caller: &IncomingCaller,
        modem: &mut impl ModemPort,
        hw: &mut impl RelayPort,
        sink: &mut impl EventSink,
    ) {
        match self.calls.handle(caller, &mut self.state.relay, hw, modem) {
            CallOutcome::Toggled { on } => sink.emit(&AppEvent::RelaySwitched {
                on,
                cause: RelayCause::AuthorizedCall,
            }),
            CallOutcome::Unauthorized => {
                sink.emit(&AppEvent::UnauthorizedCaller(caller.number.clone()));
            }
            CallOutcome::RelayFailed(e) => error!("Authorized call but relay stuck: {}", e),
        }
    }

    fn switch_relay(
        &mut self,
        on: bool,
        cause: RelayCause,
        hw: &mut impl RelayPort,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) {
        match hw.set_relay(on) {
            Ok(()) => {
                self.state.relay.record(on, now_ms);
                sink.emit(&AppEvent::RelaySwitched { on, cause });
            }
            // State untouched, so the next sweep tries again.
            Err(e) => error!("Relay switch ({:?}) failed: {}", cause, e),
        }
    }

    fn power_cycle(
        &mut self,
        modem: &mut impl ModemPort,
        cause: PowerCycleCause,
        sink: &mut impl EventSink,
    ) {
        info!("Toggling modem power ({:?})", cause);
        match modem.toggle_power() {
            Ok(()) => sink.emit(&AppEvent::ModemPowerCycled(cause)),
            Err(e) => error!("Modem power toggle failed: {}", e),
        }
    }

    fn set_task(&mut self, id: TaskId, enabled: bool, sink: &mut impl EventSink) {
        let changed = if enabled {
            self.scheduler.enable(id)
        } else {
            self.scheduler.disable(id)
        };
        if changed {
            sink.emit(&AppEvent::TaskToggled { task: id, enabled });
        }
    }

    fn forward(&mut self, modem: &mut impl ModemPort, byte: u8) {
        if let Err(e) = modem.write_byte(byte) {
            warn!("Console passthrough failed: {}", e);
        }
    }
}
