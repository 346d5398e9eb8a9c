//! Repair Simulation Engine
//!
//! Discrete-event simulator for a fleet of machines that fail at random and
//! are repaired by a small pool of specialized, shift-scheduled workers.
//!
//! ```text
//! Simulation
//! ├── Scheduler      event clock, FIFO among simultaneous events
//! ├── Machine tasks  Operational -> AwaitingRepair -> InRepair -> ...
//! ├── Worker tasks   Available <-> Resting, one exclusive Resource each
//! ├── Dispatcher     failed machine -> worker of the same type
//! └── StatsStore     repaired counts, downtime, busy time
//! ```
//!
//! ```no_run
//! use repair_simulation_engine::{Simulation, SimulationConfig};
//!
//! let mut sim = Simulation::new(SimulationConfig::default().with_seed(7))?;
//! let report = sim.run();
//! println!("{} repairs", report.total_repaired);
//! # Ok::<(), repair_simulation_engine::SimError>(())
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod machine;
pub mod resource;
pub mod scheduler;
pub mod shift;
pub mod simulator;
pub mod stats;
pub mod types;
pub mod worker;

pub use config::{MachineProfile, SimulationConfig, WorkerSpec};
pub use dispatch::{DispatchStrategy, Dispatcher};
pub use error::{Result, SimError};
pub use shift::ShiftSchedule;
pub use simulator::Simulation;
pub use stats::{SimulationReport, StatsStore, TypeReport, WorkerReport};
pub use types::{HourRange, MachineId, MachineState, MachineType, ShiftState, TraceEvent, TraceKind, WorkerId};
