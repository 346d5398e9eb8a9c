//! Run configuration
//!
//! Everything a run needs is a field of [`SimulationConfig`]. The defaults
//! describe a three-month run of 120 machines serviced by four workers on a
//! 12h-on / 36h-off rota. Configs can be built in code with the `with_*`
//! helpers or loaded from JSON; either way `validate` runs before the first
//! event is scheduled.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dispatch::DispatchStrategy;
use crate::error::{Result, SimError};
use crate::shift::ShiftSchedule;
use crate::types::{HourRange, MachineType, WorkerId};

/// Default horizon: three months in hours
pub const DEFAULT_HORIZON_HOURS: f64 = 2160.0;

/// Default RNG seed
pub const DEFAULT_SEED: u64 = 42;

/// Population and timing of one machine type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineProfile {
    pub machine_type: MachineType,
    pub population: u32,
    /// Operational time until failure
    pub failure_hours: HourRange,
    /// Time a worker spends on one repair
    pub repair_hours: HourRange,
}

impl MachineProfile {
    pub fn new(
        machine_type: MachineType,
        population: u32,
        failure_hours: HourRange,
        repair_hours: HourRange,
    ) -> Self {
        Self {
            machine_type,
            population,
            failure_hours,
            repair_hours,
        }
    }

    /// Default profile for a type
    pub fn standard(machine_type: MachineType) -> Self {
        match machine_type {
            MachineType::A => Self::new(
                MachineType::A,
                50,
                HourRange::new(420.0, 520.0),
                HourRange::new(3.0, 9.0),
            ),
            MachineType::B => Self::new(
                MachineType::B,
                40,
                HourRange::new(460.0, 560.0),
                HourRange::new(4.0, 8.0),
            ),
            MachineType::C => Self::new(
                MachineType::C,
                30,
                HourRange::new(520.0, 560.0),
                HourRange::new(2.0, 7.0),
            ),
        }
    }

    pub fn with_population(mut self, population: u32) -> Self {
        self.population = population;
        self
    }

    fn validate(&self) -> Result<()> {
        let t = self.machine_type;
        self.failure_hours.validate(&format!("type {t} failure"))?;
        self.repair_hours.validate(&format!("type {t} repair"))?;

        // A zero failure interval would let a machine fail again at the
        // instant it was repaired, forever.
        if self.failure_hours.min <= 0.0 {
            return Err(SimError::invalid_range(
                format!("type {t} failure"),
                self.failure_hours.min,
                self.failure_hours.max,
            ));
        }
        Ok(())
    }
}

/// A repair worker and the machine type it services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSpec {
    pub id: WorkerId,
    pub machine_type: MachineType,
}

impl WorkerSpec {
    pub fn new(id: u32, machine_type: MachineType) -> Self {
        Self {
            id: WorkerId(id),
            machine_type,
        }
    }
}

/// Complete configuration of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub horizon_hours: f64,
    pub seed: u64,
    pub machines: Vec<MachineProfile>,
    /// Order matters: it is the dispatch scan order within a type
    pub workers: Vec<WorkerSpec>,
    pub shift: ShiftSchedule,
    pub dispatch: DispatchStrategy,
    pub record_trace: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon_hours: DEFAULT_HORIZON_HOURS,
            seed: DEFAULT_SEED,
            machines: MachineType::ALL
                .iter()
                .map(|&t| MachineProfile::standard(t))
                .collect(),
            workers: vec![
                WorkerSpec::new(0, MachineType::A),
                WorkerSpec::new(1, MachineType::B),
                WorkerSpec::new(2, MachineType::C),
                WorkerSpec::new(3, MachineType::A),
            ],
            shift: ShiftSchedule::default(),
            dispatch: DispatchStrategy::default(),
            record_trace: true,
        }
    }
}

impl SimulationConfig {
    /// Default fleet and workers with a custom horizon
    pub fn new(horizon_hours: f64) -> Self {
        Self {
            horizon_hours,
            ..Self::default()
        }
    }

    /// Load a config from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_horizon(mut self, horizon_hours: f64) -> Self {
        self.horizon_hours = horizon_hours;
        self
    }

    pub fn with_machines(mut self, machines: Vec<MachineProfile>) -> Self {
        self.machines = machines;
        self
    }

    pub fn with_workers(mut self, workers: Vec<WorkerSpec>) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_shift(mut self, shift: ShiftSchedule) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchStrategy) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn without_trace(mut self) -> Self {
        self.record_trace = false;
        self
    }

    /// Profile for a machine type, if configured
    pub fn profile(&self, machine_type: MachineType) -> Option<&MachineProfile> {
        self.machines.iter().find(|p| p.machine_type == machine_type)
    }

    /// Total number of machines across all types
    pub fn total_machines(&self) -> u64 {
        self.machines.iter().map(|p| p.population as u64).sum()
    }

    /// Reject anything that would make the run meaningless
    pub fn validate(&self) -> Result<()> {
        if !self.horizon_hours.is_finite() || self.horizon_hours <= 0.0 {
            return Err(SimError::InvalidHorizon(self.horizon_hours));
        }

        self.shift.validate()?;

        let mut seen_types = HashSet::new();
        for profile in &self.machines {
            if !seen_types.insert(profile.machine_type) {
                return Err(SimError::DuplicateMachineType(profile.machine_type));
            }
            profile.validate()?;
        }

        if self.total_machines() == 0 {
            return Err(SimError::EmptyFleet);
        }

        if self.workers.is_empty() {
            return Err(SimError::NoWorkers);
        }

        let mut seen_workers = HashSet::new();
        for worker in &self.workers {
            if !seen_workers.insert(worker.id) {
                return Err(SimError::DuplicateWorker(worker.id));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_machines(), 120);
        assert_eq!(config.workers.len(), 4);
        assert_eq!(config.horizon_hours, 2160.0);

        let a = config.profile(MachineType::A).unwrap();
        assert_eq!(a.failure_hours, HourRange::new(420.0, 520.0));
        assert_eq!(a.repair_hours, HourRange::new(3.0, 9.0));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let mut profile = MachineProfile::standard(MachineType::B);
        profile.repair_hours = HourRange::new(8.0, 4.0);
        let config = SimulationConfig::default().with_machines(vec![profile]);

        match config.validate() {
            Err(SimError::InvalidRange { what, min, max }) => {
                assert_eq!(what, "type B repair");
                assert_eq!((min, max), (8.0, 4.0));
            }
            other => panic!("expected InvalidRange, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_zero_failure_interval() {
        let mut profile = MachineProfile::standard(MachineType::C);
        profile.failure_hours = HourRange::new(0.0, 10.0);
        let config = SimulationConfig::default().with_machines(vec![profile]);

        assert!(matches!(config.validate(), Err(SimError::InvalidRange { .. })));
    }

    #[test]
    fn test_rejects_bad_horizon_and_shift() {
        let config = SimulationConfig::new(0.0);
        assert!(matches!(config.validate(), Err(SimError::InvalidHorizon(_))));

        let config = SimulationConfig::default().with_shift(ShiftSchedule::new(12.0, 0.0));
        assert!(matches!(config.validate(), Err(SimError::InvalidShift { .. })));
    }

    #[test]
    fn test_rejects_empty_fleet_and_no_workers() {
        let config = SimulationConfig::default().with_machines(vec![
            MachineProfile::standard(MachineType::A).with_population(0),
        ]);
        assert!(matches!(config.validate(), Err(SimError::EmptyFleet)));

        let config = SimulationConfig::default().with_workers(vec![]);
        assert!(matches!(config.validate(), Err(SimError::NoWorkers)));
    }

    #[test]
    fn test_rejects_duplicates() {
        let config = SimulationConfig::default().with_machines(vec![
            MachineProfile::standard(MachineType::A),
            MachineProfile::standard(MachineType::A),
        ]);
        assert!(matches!(
            config.validate(),
            Err(SimError::DuplicateMachineType(MachineType::A))
        ));

        let config = SimulationConfig::default().with_workers(vec![
            WorkerSpec::new(1, MachineType::A),
            WorkerSpec::new(1, MachineType::B),
        ]);
        assert!(matches!(config.validate(), Err(SimError::DuplicateWorker(WorkerId(1)))));
    }

    #[test]
    fn test_type_without_workers_is_allowed() {
        let config = SimulationConfig::default().with_workers(vec![WorkerSpec::new(0, MachineType::A)]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = SimulationConfig::from_json(
            r#"{
                "horizon_hours": 500.0,
                "seed": 7,
                "workers": [{ "id": 9, "machine_type": "C" }],
                "dispatch": "LeastQueued"
            }"#,
        )
        .unwrap();

        assert_eq!(config.horizon_hours, 500.0);
        assert_eq!(config.seed, 7);
        assert_eq!(config.workers, vec![WorkerSpec::new(9, MachineType::C)]);
        assert_eq!(config.dispatch, DispatchStrategy::LeastQueued);
        assert_eq!(config.machines.len(), 3);
        assert_eq!(config.shift, ShiftSchedule::default());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = SimulationConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SimError::Json(_)));
    }
}
