//! Machine lifecycle
//!
//! ```text
//! Operational --fail--> AwaitingRepair --begin_repair--> InRepair --complete_repair--+
//!      ^                                                                             |
//!      +-----------------------------------------------------------------------------+
//! ```
//!
//! Every transition checks the current state; an out-of-order transition is
//! a bug in the event loop and panics.

use serde::{Deserialize, Serialize};

use crate::types::{MachineId, MachineState};

/// Timing of one finished repair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepairOutcome {
    /// Failure to completion
    pub downtime: f64,
    /// Start of repair to completion
    pub repair_hours: f64,
}

/// A machine in the fleet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub id: MachineId,
    pub state: MachineState,
    /// When the machine entered AwaitingRepair; `None` while Operational
    pub broken_at: Option<f64>,
    /// Worker arena index servicing (or queued for) this machine
    pub assigned_worker: Option<usize>,
    /// When the current repair started
    pub repair_started_at: Option<f64>,
    /// Completed failure/repair cycles
    pub repairs: u64,
}

impl Machine {
    pub fn new(id: MachineId) -> Self {
        Machine {
            id,
            state: MachineState::Operational,
            broken_at: None,
            assigned_worker: None,
            repair_started_at: None,
            repairs: 0,
        }
    }

    pub fn is_operational(&self) -> bool {
        self.state == MachineState::Operational
    }

    /// Operational -> AwaitingRepair
    pub fn fail(&mut self, now: f64) {
        self.expect_state(MachineState::Operational, "fail");
        self.state = MachineState::AwaitingRepair;
        self.broken_at = Some(now);
    }

    /// Remember which worker was asked to repair this machine
    pub fn assign(&mut self, worker: usize) {
        self.expect_state(MachineState::AwaitingRepair, "assign");
        self.assigned_worker = Some(worker);
    }

    /// AwaitingRepair -> InRepair
    pub fn begin_repair(&mut self, now: f64) {
        self.expect_state(MachineState::AwaitingRepair, "begin_repair");
        self.state = MachineState::InRepair;
        self.repair_started_at = Some(now);
    }

    /// InRepair -> Operational
    pub fn complete_repair(&mut self, now: f64) -> RepairOutcome {
        self.expect_state(MachineState::InRepair, "complete_repair");
        let (Some(broken_at), Some(started_at)) = (self.broken_at.take(), self.repair_started_at.take())
        else {
            panic!("machine {} in repair without failure/start times", self.id);
        };

        self.state = MachineState::Operational;
        self.assigned_worker = None;
        self.repairs += 1;
        RepairOutcome {
            downtime: now - broken_at,
            repair_hours: now - started_at,
        }
    }

    /// Downtime accumulated so far in the current outage
    pub fn current_downtime(&self, now: f64) -> f64 {
        self.broken_at.map(|t| now - t).unwrap_or(0.0)
    }

    fn expect_state(&self, expected: MachineState, transition: &str) {
        assert!(
            self.state == expected,
            "machine {}: {transition} from {:?}, expected {expected:?}",
            self.id,
            self.state
        );
    }
}
