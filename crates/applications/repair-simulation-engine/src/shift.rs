//! Worker shift schedule
//!
//! Workers alternate between an Available window of `work_hours` and a
//! Resting window of `rest_hours`, forever:
//!
//! ```text
//! 0          work        work+rest (= cycle)
//! |--Available--|-----Resting-----|--Available--|-----Resting-----| ...
//! ```
//!
//! The phase is anchored at simulated time zero. A worker joining mid-cycle
//! first finishes whatever is left of its current window, then alternates
//! full windows.
//!
//! Shift state is tracked and traced but does not gate dispatch: a resting
//! worker whose queue is free can still be handed a repair, and a repair in
//! progress is never evicted when a shift ends.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::types::ShiftState;

/// Work/rest durations of one shift cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShiftSchedule {
    pub work_hours: f64,
    pub rest_hours: f64,
}

impl Default for ShiftSchedule {
    fn default() -> Self {
        Self {
            work_hours: 12.0,
            rest_hours: 36.0,
        }
    }
}

impl ShiftSchedule {
    pub fn new(work_hours: f64, rest_hours: f64) -> Self {
        Self {
            work_hours,
            rest_hours,
        }
    }

    /// Length of one full Available + Resting cycle
    pub fn cycle_hours(&self) -> f64 {
        self.work_hours + self.rest_hours
    }

    pub fn validate(&self) -> Result<()> {
        let ok = |h: f64| h.is_finite() && h > 0.0;
        if !ok(self.work_hours) || !ok(self.rest_hours) {
            return Err(SimError::InvalidShift {
                work: self.work_hours,
                rest: self.rest_hours,
            });
        }
        Ok(())
    }

    /// Phase at time `t` and hours until the next transition
    pub fn phase_at(&self, t: f64) -> (ShiftState, f64) {
        let cycle = self.cycle_hours();
        let offset = t.rem_euclid(cycle);

        if offset < self.work_hours {
            (ShiftState::Available, self.work_hours - offset)
        } else {
            (ShiftState::Resting, cycle - offset)
        }
    }
}

/// Per-worker shift state machine
///
/// `start` places the worker in the cycle; each `advance` flips the state
/// and returns the length of the full window just entered.
#[derive(Debug, Clone)]
pub struct ShiftClock {
    schedule: ShiftSchedule,
    state: ShiftState,
}

impl ShiftClock {
    pub fn new(schedule: ShiftSchedule) -> Self {
        Self {
            schedule,
            state: ShiftState::Available,
        }
    }

    /// Enter the cycle at `now`; returns hours until the first transition
    pub fn start(&mut self, now: f64) -> f64 {
        let (state, remaining) = self.schedule.phase_at(now);
        self.state = state;
        remaining
    }

    /// Flip to the other window; returns hours until the next transition
    pub fn advance(&mut self) -> f64 {
        match self.state {
            ShiftState::Available => {
                self.state = ShiftState::Resting;
                self.schedule.rest_hours
            }
            ShiftState::Resting => {
                self.state = ShiftState::Available;
                self.schedule.work_hours
            }
        }
    }

    pub fn state(&self) -> ShiftState {
        self.state
    }
}
