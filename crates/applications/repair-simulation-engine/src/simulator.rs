//! Discrete-event simulator for the repair shop
//!
//! Machines and workers are long-lived tasks expressed as state machines.
//! Each suspended task is a [`Continuation`] waiting in the [`Scheduler`];
//! the run loop pops one at a time and resumes it. Tasks suspend in exactly
//! two ways: on a timer (failure, repair, shift change) or on a worker's
//! [`Resource`](crate::resource::Resource) (queued repair).
//!
//! ```text
//! Fail ──dispatch──► worker free? ──yes──► repair timer ──► CompleteRepair
//!                        │                                      │
//!                        no ─► queue on worker                  ├─ release: next waiter
//!                                   ▲                           │   gets StartRepair (t+0)
//!                                   └──────── StartRepair ◄─────┘
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::{MachineProfile, SimulationConfig};
use crate::dispatch::{DispatchCandidate, Dispatcher};
use crate::error::Result;
use crate::machine::Machine;
use crate::resource::Acquire;
use crate::scheduler::Scheduler;
use crate::stats::{SimulationReport, StatsStore, TypeReport, WorkerReport};
use crate::types::{MachineId, MachineState, MachineType, ShiftState, TraceEvent, TraceKind, WorkerId};
use crate::worker::Worker;

/// A suspended task waiting to be resumed. Indices point into the
/// simulation's machine and worker arenas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuation {
    /// Machine's operational timer ran out
    Fail { machine: usize },
    /// Queued machine was handed the worker by a release
    StartRepair { machine: usize, worker: usize },
    /// Repair timer ran out
    CompleteRepair { machine: usize, worker: usize },
    /// Worker's shift window ended
    ShiftChange { worker: usize },
}

/// One simulation run
pub struct Simulation {
    config: SimulationConfig,
    scheduler: Scheduler<Continuation>,
    machines: Vec<Machine>,
    workers: Vec<Worker>,
    /// Worker indices per machine type, in dispatch scan order
    workers_by_type: [Vec<usize>; 3],
    profiles: [Option<MachineProfile>; 3],
    dispatcher: Dispatcher,
    stats: StatsStore,
    rng: StdRng,
    trace: Vec<TraceEvent>,
    started: bool,
    total_failures: u64,
    events_processed: u64,
}

impl Simulation {
    /// Validate `config` and build the fleet. Nothing is scheduled yet.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut profiles: [Option<MachineProfile>; 3] = Default::default();
        let mut machines = Vec::new();
        for profile in &config.machines {
            for seq in 1..=profile.population {
                machines.push(Machine::new(MachineId::new(profile.machine_type, seq)));
            }
            profiles[profile.machine_type.index()] = Some(profile.clone());
        }

        let mut workers = Vec::with_capacity(config.workers.len());
        let mut workers_by_type: [Vec<usize>; 3] = Default::default();
        for spec in &config.workers {
            workers_by_type[spec.machine_type.index()].push(workers.len());
            workers.push(Worker::new(spec.id, spec.machine_type, config.shift));
        }

        Ok(Simulation {
            scheduler: Scheduler::new(),
            machines,
            workers,
            workers_by_type,
            profiles,
            dispatcher: Dispatcher::new(config.dispatch),
            stats: StatsStore::new(),
            rng: StdRng::seed_from_u64(config.seed),
            trace: Vec::new(),
            started: false,
            total_failures: 0,
            events_processed: 0,
            config,
        })
    }

    /// Run to the configured horizon and return the report
    pub fn run(&mut self) -> SimulationReport {
        self.run_until(self.config.horizon_hours);

        info!(
            horizon = self.config.horizon_hours,
            events = self.events_processed,
            failures = self.total_failures,
            repaired = self.stats.total_repaired(),
            "Simulation finished"
        );

        self.report()
    }

    /// Process every event due at or before `until`, then park the clock
    /// at `until`. Can be called repeatedly with increasing times.
    pub fn run_until(&mut self, until: f64) {
        if !self.started {
            self.bootstrap();
        }

        while let Some(continuation) = self.scheduler.pop_until(until) {
            self.events_processed += 1;
            self.resume(continuation);
        }

        self.scheduler.advance_to(until);
    }

    /// Start every machine and worker task at the current time
    fn bootstrap(&mut self) {
        self.started = true;

        info!(
            machines = self.machines.len(),
            workers = self.workers.len(),
            horizon = self.config.horizon_hours,
            seed = self.config.seed,
            dispatch = ?self.dispatcher.strategy(),
            "Starting simulation"
        );

        for t in MachineType::ALL {
            let population = self.profiles[t.index()].as_ref().map_or(0, |p| p.population);
            if population > 0 && self.workers_by_type[t.index()].is_empty() {
                warn!(machine_type = %t, population, "No workers for machine type, failures will never be repaired");
            }
        }

        let now = self.now();
        for worker in 0..self.workers.len() {
            let delay = self.workers[worker].start_shift(now);
            self.scheduler.schedule_after(delay, Continuation::ShiftChange { worker });
        }

        for machine in 0..self.machines.len() {
            self.schedule_failure(machine);
        }
    }

    fn resume(&mut self, continuation: Continuation) {
        match continuation {
            Continuation::Fail { machine } => self.handle_failure(machine),
            Continuation::StartRepair { machine, worker } => self.handle_start_repair(machine, worker),
            Continuation::CompleteRepair { machine, worker } => {
                self.handle_repair_completion(machine, worker)
            }
            Continuation::ShiftChange { worker } => self.handle_shift_change(worker),
        }
    }

    /// Operational -> AwaitingRepair, then dispatch
    fn handle_failure(&mut self, machine: usize) {
        let now = self.now();
        self.machines[machine].fail(now);
        self.total_failures += 1;

        let id = self.machines[machine].id;
        info!(time = now, machine = %id, "Machine failed");
        self.record(TraceKind::Failed { machine: id });

        self.dispatch(machine);
    }

    /// Hand a failed machine to one worker of its type
    fn dispatch(&mut self, machine: usize) {
        let machine_type = self.machines[machine].id.machine_type;
        let candidates: Vec<DispatchCandidate> = self.workers_by_type[machine_type.index()]
            .iter()
            .map(|&w| DispatchCandidate {
                worker: w,
                occupied: self.workers[w].is_busy(),
                queue_len: self.workers[w].queue_len(),
            })
            .collect();

        // No worker for this type: the machine stays down until the horizon
        let Some(worker) = self.dispatcher.select(&candidates) else {
            return;
        };

        self.machines[machine].assign(worker);
        match self.workers[worker].request(machine) {
            Acquire::Granted => self.begin_repair(machine, worker),
            Acquire::Queued { position } => {
                let (machine_id, worker_id) = (self.machines[machine].id, self.workers[worker].id);
                debug!(
                    time = self.now(),
                    machine = %machine_id,
                    worker = %worker_id,
                    position,
                    "Worker busy, repair queued"
                );
                self.record(TraceKind::RepairQueued {
                    machine: machine_id,
                    worker: worker_id,
                    position,
                });
            }
        }
    }

    /// Queued machine reached the head of the worker's queue
    fn handle_start_repair(&mut self, machine: usize, worker: usize) {
        assert_eq!(
            self.workers[worker].current_machine(),
            Some(machine),
            "worker {} woke machine {} it does not hold",
            self.workers[worker].id,
            self.machines[machine].id
        );
        self.begin_repair(machine, worker);
    }

    /// AwaitingRepair -> InRepair; start the repair timer
    fn begin_repair(&mut self, machine: usize, worker: usize) {
        let now = self.now();
        let machine_type = self.machines[machine].id.machine_type;
        let repair_hours = self.profile(machine_type).repair_hours;
        let duration = repair_hours.sample(&mut self.rng);

        self.machines[machine].begin_repair(now);

        let (machine_id, worker_id) = (self.machines[machine].id, self.workers[worker].id);
        info!(
            time = now,
            machine = %machine_id,
            worker = %worker_id,
            duration,
            on_shift = self.workers[worker].is_on_shift(),
            "Repair started"
        );
        self.record(TraceKind::RepairStarted {
            machine: machine_id,
            worker: worker_id,
            duration,
        });

        self.scheduler
            .schedule_after(duration, Continuation::CompleteRepair { machine, worker });
    }

    /// InRepair -> Operational; release the worker and book the statistics
    fn handle_repair_completion(&mut self, machine: usize, worker: usize) {
        let now = self.now();
        assert_eq!(
            self.machines[machine].assigned_worker,
            Some(worker),
            "machine {} completed by worker {} it was not assigned to",
            self.machines[machine].id,
            self.workers[worker].id
        );
        let outcome = self.machines[machine].complete_repair(now);
        let next = self.workers[worker].finish_repair(machine, outcome.repair_hours);

        let (machine_id, worker_id) = (self.machines[machine].id, self.workers[worker].id);
        self.stats.record_repair(machine_id.machine_type, outcome.downtime);
        self.stats.record_busy(worker_id, outcome.repair_hours);

        info!(
            time = now,
            machine = %machine_id,
            worker = %worker_id,
            downtime = outcome.downtime,
            "Machine repaired"
        );
        self.record(TraceKind::Repaired {
            machine: machine_id,
            worker: worker_id,
            downtime: outcome.downtime,
        });

        // The promoted waiter resumes on the next scheduler turn
        if let Some(next) = next {
            self.scheduler
                .schedule_after(0.0, Continuation::StartRepair { machine: next, worker });
        }

        self.schedule_failure(machine);
    }

    fn handle_shift_change(&mut self, worker: usize) {
        let delay = self.workers[worker].change_shift();
        let w = &self.workers[worker];
        let (worker_id, state) = (w.id, w.shift_state());

        debug!(time = self.now(), worker = %worker_id, state = ?state, "Shift change");
        self.record(match state {
            ShiftState::Available => TraceKind::ShiftStarted { worker: worker_id },
            ShiftState::Resting => TraceKind::ShiftEnded { worker: worker_id },
        });

        self.scheduler
            .schedule_after(delay, Continuation::ShiftChange { worker });
    }

    fn schedule_failure(&mut self, machine: usize) {
        let machine_type = self.machines[machine].id.machine_type;
        let failure_hours = self.profile(machine_type).failure_hours;
        let delay = failure_hours.sample(&mut self.rng);
        self.scheduler.schedule_after(delay, Continuation::Fail { machine });
    }

    fn profile(&self, machine_type: MachineType) -> &MachineProfile {
        self.profiles[machine_type.index()]
            .as_ref()
            .unwrap_or_else(|| panic!("no profile for machine type {machine_type}"))
    }

    fn record(&mut self, kind: TraceKind) {
        if self.config.record_trace {
            self.trace.push(TraceEvent {
                time: self.scheduler.now(),
                kind,
            });
        }
    }

    /// Current simulated time
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn stats(&self) -> &StatsStore {
        &self.stats
    }

    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn worker(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == id)
    }

    pub fn machine(&self, id: MachineId) -> Option<&Machine> {
        self.machines.iter().find(|m| m.id == id)
    }

    /// Ordered event trace (empty when tracing is disabled)
    pub fn trace(&self) -> &[TraceEvent] {
        &self.trace
    }

    /// Snapshot of the statistics at the current time
    pub fn report(&self) -> SimulationReport {
        let horizon = self.config.horizon_hours;

        let types = self
            .config
            .machines
            .iter()
            .map(|profile| {
                let t = profile.machine_type;
                TypeReport {
                    machine_type: t,
                    population: profile.population,
                    repaired: self.stats.repaired(t),
                    total_downtime_hours: self.stats.total_downtime(t),
                    average_downtime_hours: self.stats.average_downtime(t),
                }
            })
            .collect();

        let workers = self
            .workers
            .iter()
            .map(|w| WorkerReport {
                worker: w.id,
                machine_type: w.machine_type,
                busy_hours: self.stats.busy_hours(w.id),
                busy_percentage: self.stats.busy_percentage(w.id, horizon),
                repairs_completed: w.repairs_completed(),
            })
            .collect();

        SimulationReport {
            horizon_hours: horizon,
            seed: self.config.seed,
            types,
            workers,
            total_failures: self.total_failures,
            total_repaired: self.stats.total_repaired(),
            machines_down_at_horizon: self
                .machines
                .iter()
                .filter(|m| m.state != MachineState::Operational)
                .count(),
            events_processed: self.events_processed,
        }
    }
}
