//! Core types for the simulation engine

use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Machine type. Every worker is trained for exactly one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MachineType {
    A,
    B,
    C,
}

impl MachineType {
    /// All machine types in reporting order
    pub const ALL: [MachineType; 3] = [MachineType::A, MachineType::B, MachineType::C];

    /// Dense index for per-type arrays
    pub fn index(self) -> usize {
        match self {
            MachineType::A => 0,
            MachineType::B => 1,
            MachineType::C => 2,
        }
    }
}

impl std::fmt::Display for MachineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MachineType::A => write!(f, "A"),
            MachineType::B => write!(f, "B"),
            MachineType::C => write!(f, "C"),
        }
    }
}

/// Machine identity: type plus 1-based sequence number within the type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MachineId {
    pub machine_type: MachineType,
    pub seq: u32,
}

impl MachineId {
    pub fn new(machine_type: MachineType, seq: u32) -> Self {
        Self { machine_type, seq }
    }
}

impl std::fmt::Display for MachineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.machine_type, self.seq)
    }
}

/// Unique identifier for a repair worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(pub u32);

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineState {
    Operational,
    AwaitingRepair,
    InRepair,
}

/// Shift phase of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftState {
    Available,
    Resting,
}

/// Closed interval of hours for a uniform draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourRange {
    pub min: f64,
    pub max: f64,
}

impl HourRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Midpoint of the interval (mean of the uniform draw)
    pub fn mean(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Check the range is finite, non-negative and ordered
    pub fn validate(&self, what: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min < 0.0 || self.min > self.max {
            return Err(SimError::invalid_range(what, self.min, self.max));
        }
        Ok(())
    }

    /// Draw a duration uniformly from `[min, max]`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.min == self.max {
            return self.min;
        }
        Uniform::new_inclusive(self.min, self.max).sample(rng)
    }
}

/// Entry in the ordered event trace of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub time: f64,
    pub kind: TraceKind,
}

/// What happened at a trace point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceKind {
    /// Machine left Operational
    Failed { machine: MachineId },
    /// Chosen worker was busy; machine waits in its queue
    RepairQueued {
        machine: MachineId,
        worker: WorkerId,
        position: usize,
    },
    /// Worker started servicing the machine
    RepairStarted {
        machine: MachineId,
        worker: WorkerId,
        duration: f64,
    },
    /// Repair finished, machine back to Operational
    Repaired {
        machine: MachineId,
        worker: WorkerId,
        downtime: f64,
    },
    ShiftEnded { worker: WorkerId },
    ShiftStarted { worker: WorkerId },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_machine_id_display() {
        assert_eq!(MachineId::new(MachineType::B, 7).to_string(), "B7");
        assert_eq!(WorkerId(3).to_string(), "3");
    }

    #[test]
    fn test_machine_type_index_matches_all() {
        for (i, t) in MachineType::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
    }

    #[test]
    fn test_hour_range_sample_within_bounds() {
        let range = HourRange::new(420.0, 520.0);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1000 {
            let x = range.sample(&mut rng);
            assert!((420.0..=520.0).contains(&x));
        }
    }

    #[test]
    fn test_degenerate_range_is_constant() {
        let range = HourRange::new(5.0, 5.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(range.sample(&mut rng), 5.0);
    }

    #[test]
    fn test_hour_range_validation() {
        assert!(HourRange::new(3.0, 9.0).validate("repair").is_ok());
        assert!(HourRange::new(9.0, 3.0).validate("repair").is_err());
        assert!(HourRange::new(-1.0, 3.0).validate("repair").is_err());
        assert!(HourRange::new(0.0, f64::INFINITY).validate("repair").is_err());
    }

    #[test]
    fn test_machine_type_serialization() {
        let json = serde_json::to_string(&MachineType::C).unwrap();
        assert_eq!(json, "\"C\"");

        let parsed: MachineType = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, MachineType::C);
    }
}
