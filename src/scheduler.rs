//! Cooperative task scheduler.
//!
//! Fixed-interval tasks run in registration order, one after another,
//! from the main loop.  There is no preemption: a task runs to
//! completion before the next one is considered, so every task observes
//! the writes of the tasks before it.
//!
//! ```text
//!  main loop ──▶ AppService.tick()
//!                   │
//!                   ├─ for id in scheduler.task_ids():
//!                   │     if scheduler.take_due(id, now) → run task
//!                   │
//!                   └─ unsolicited dispatcher
//! ```
//!
//! Enable flags are the only runtime control.  Enabling a disabled task
//! makes it due on the next pass; its interval counts from that run.

use heapless::Vec;
use log::info;

use crate::app::ports::elapsed_ms;

/// Scheduled tasks known to the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskId {
    /// Registration poll.
    NetworkStatus,
    /// Time-constraint sweep.
    TimeConstraints,
}

/// Maximum number of tasks (stack-allocated).
const MAX_TASKS: usize = 4;

/// Internal bookkeeping for a registered task.
#[derive(Debug, Clone)]
struct TaskEntry {
    id: TaskId,
    /// Human-readable label for logs.
    label: &'static str,
    interval_ms: u64,
    enabled: bool,
    /// `None` until the first run after (re-)enabling.
    last_run_ms: Option<u64>,
}

/// The scheduler engine.
pub struct Scheduler {
    tasks: Vec<TaskEntry, MAX_TASKS>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Register a task.  Returns `false` if the table is full or the id
    /// is already registered.
    pub fn add(&mut self, id: TaskId, label: &'static str, interval_ms: u64, enabled: bool) -> bool {
        if self.entry(id).is_some() {
            return false;
        }
        let pushed = self
            .tasks
            .push(TaskEntry {
                id,
                label,
                interval_ms,
                enabled,
                last_run_ms: None,
            })
            .is_ok();
        if pushed {
            info!(
                "Scheduler: added '{}' every {}ms ({})",
                label,
                interval_ms,
                if enabled { "enabled" } else { "disabled" }
            );
        }
        pushed
    }

    /// Enable a task.  Returns `true` if it was previously disabled.
    pub fn enable(&mut self, id: TaskId) -> bool {
        match self.entry_mut(id) {
            Some(task) if !task.enabled => {
                task.enabled = true;
                task.last_run_ms = None;
                info!("Scheduler: '{}' enabled", task.label);
                true
            }
            _ => false,
        }
    }

    /// Disable a task.  Returns `true` if it was previously enabled.
    pub fn disable(&mut self, id: TaskId) -> bool {
        match self.entry_mut(id) {
            Some(task) if task.enabled => {
                task.enabled = false;
                info!("Scheduler: '{}' disabled", task.label);
                true
            }
            _ => false,
        }
    }

    pub fn is_enabled(&self, id: TaskId) -> bool {
        self.entry(id).is_some_and(|t| t.enabled)
    }

    /// Registered task ids in registration order.
    pub fn task_ids(&self) -> Vec<TaskId, MAX_TASKS> {
        self.tasks.iter().map(|t| t.id).collect()
    }

    /// If the task is enabled and its interval has elapsed, mark it as
    /// run at `now_ms` and return `true`.
    pub fn take_due(&mut self, id: TaskId, now_ms: u64) -> bool {
        let Some(task) = self.entry_mut(id) else {
            return false;
        };
        if !task.enabled {
            return false;
        }
        let due = match task.last_run_ms {
            None => true,
            Some(last) => elapsed_ms(now_ms, last) >= task.interval_ms,
        };
        if due {
            task.last_run_ms = Some(now_ms);
        }
        due
    }

    fn entry(&self, id: TaskId) -> Option<&TaskEntry> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn entry_mut(&mut self, id: TaskId) -> Option<&mut TaskEntry> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
