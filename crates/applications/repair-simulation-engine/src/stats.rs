//! Run statistics
//!
//! Counters only move when a repair completes, so everything here is
//! monotonically non-decreasing over a run. Repairs still in progress at the
//! horizon are not counted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{MachineType, WorkerId};

/// Per-type repair counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeStats {
    pub repaired: u64,
    pub total_downtime_hours: f64,
}

/// Accumulates repair statistics for one run
#[derive(Debug, Clone, Default)]
pub struct StatsStore {
    per_type: [TypeStats; 3],
    busy_hours: BTreeMap<WorkerId, f64>,
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a completed repair and its downtime
    pub fn record_repair(&mut self, machine_type: MachineType, downtime: f64) {
        debug_assert!(downtime >= 0.0, "negative downtime {downtime}");
        let entry = &mut self.per_type[machine_type.index()];
        entry.repaired += 1;
        entry.total_downtime_hours += downtime;
    }

    /// Charge repair time to a worker
    pub fn record_busy(&mut self, worker: WorkerId, hours: f64) {
        debug_assert!(hours >= 0.0, "negative busy time {hours}");
        *self.busy_hours.entry(worker).or_insert(0.0) += hours;
    }

    pub fn type_stats(&self, machine_type: MachineType) -> TypeStats {
        self.per_type[machine_type.index()]
    }

    pub fn repaired(&self, machine_type: MachineType) -> u64 {
        self.per_type[machine_type.index()].repaired
    }

    pub fn total_downtime(&self, machine_type: MachineType) -> f64 {
        self.per_type[machine_type.index()].total_downtime_hours
    }

    /// Mean downtime per repaired machine, 0 when nothing was repaired
    pub fn average_downtime(&self, machine_type: MachineType) -> f64 {
        let stats = self.type_stats(machine_type);
        if stats.repaired == 0 {
            0.0
        } else {
            stats.total_downtime_hours / stats.repaired as f64
        }
    }

    pub fn total_repaired(&self) -> u64 {
        self.per_type.iter().map(|s| s.repaired).sum()
    }

    /// Hours a worker spent repairing; 0 for workers that never finished one
    pub fn busy_hours(&self, worker: WorkerId) -> f64 {
        self.busy_hours.get(&worker).copied().unwrap_or(0.0)
    }

    /// Busy time as a percentage of `horizon_hours`
    pub fn busy_percentage(&self, worker: WorkerId, horizon_hours: f64) -> f64 {
        if horizon_hours <= 0.0 {
            0.0
        } else {
            self.busy_hours(worker) / horizon_hours * 100.0
        }
    }
}

/// Per-type row of the final report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeReport {
    pub machine_type: MachineType,
    pub population: u32,
    pub repaired: u64,
    pub total_downtime_hours: f64,
    pub average_downtime_hours: f64,
}

/// Per-worker row of the final report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerReport {
    pub worker: WorkerId,
    pub machine_type: MachineType,
    pub busy_hours: f64,
    pub busy_percentage: f64,
    pub repairs_completed: u64,
}

/// Result of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub horizon_hours: f64,
    pub seed: u64,
    pub types: Vec<TypeReport>,
    pub workers: Vec<WorkerReport>,
    pub total_failures: u64,
    pub total_repaired: u64,
    /// Machines not Operational when the horizon was reached
    pub machines_down_at_horizon: usize,
    pub events_processed: u64,
}

impl SimulationReport {
    pub fn type_report(&self, machine_type: MachineType) -> Option<&TypeReport> {
        self.types.iter().find(|t| t.machine_type == machine_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_repair_accumulates_per_type() {
        let mut stats = StatsStore::new();
        stats.record_repair(MachineType::A, 10.0);
        stats.record_repair(MachineType::A, 20.0);
        stats.record_repair(MachineType::C, 4.0);

        assert_eq!(stats.repaired(MachineType::A), 2);
        assert_eq!(stats.total_downtime(MachineType::A), 30.0);
        assert_eq!(stats.average_downtime(MachineType::A), 15.0);
        assert_eq!(stats.repaired(MachineType::B), 0);
        assert_eq!(stats.average_downtime(MachineType::B), 0.0);
        assert_eq!(stats.total_repaired(), 3);
    }

    #[test]
    fn test_busy_time_and_percentage() {
        let mut stats = StatsStore::new();
        stats.record_busy(WorkerId(3), 100.0);
        stats.record_busy(WorkerId(3), 116.0);

        assert_eq!(stats.busy_hours(WorkerId(3)), 216.0);
        assert_eq!(stats.busy_percentage(WorkerId(3), 2160.0), 10.0);
        assert_eq!(stats.busy_hours(WorkerId(0)), 0.0);
    }

    #[test]
    fn test_report_serialization() {
        let report = SimulationReport {
            horizon_hours: 100.0,
            seed: 1,
            types: vec![TypeReport {
                machine_type: MachineType::B,
                population: 2,
                repaired: 1,
                total_downtime_hours: 6.0,
                average_downtime_hours: 6.0,
            }],
            workers: vec![],
            total_failures: 1,
            total_repaired: 1,
            machines_down_at_horizon: 0,
            events_processed: 3,
        };

        let json = serde_json::to_string(&report).unwrap();
        let parsed: SimulationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
        assert_eq!(parsed.type_report(MachineType::B).unwrap().repaired, 1);
        assert!(parsed.type_report(MachineType::A).is_none());
    }
}
