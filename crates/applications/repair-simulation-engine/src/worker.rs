//! Repair workers
//!
//! A worker services one machine type. Its [`Resource`] serializes repairs:
//! the occupant is the machine under repair, waiters are machines queued on
//! this worker. Machines are referred to by arena index.

use crate::resource::{Acquire, Resource};
use crate::shift::{ShiftClock, ShiftSchedule};
use crate::types::{MachineType, ShiftState, WorkerId};

/// A repair worker
#[derive(Debug, Clone)]
pub struct Worker {
    pub id: WorkerId,
    pub machine_type: MachineType,
    resource: Resource<usize>,
    shift: ShiftClock,
    total_busy_hours: f64,
    repairs_completed: u64,
}

impl Worker {
    pub fn new(id: WorkerId, machine_type: MachineType, schedule: ShiftSchedule) -> Self {
        Worker {
            id,
            machine_type,
            resource: Resource::new(),
            shift: ShiftClock::new(schedule),
            total_busy_hours: 0.0,
            repairs_completed: 0,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.resource.is_occupied()
    }

    /// Machine currently being repaired
    pub fn current_machine(&self) -> Option<usize> {
        self.resource.occupant().copied()
    }

    pub fn queue_len(&self) -> usize {
        self.resource.queue_len()
    }

    /// Request this worker for a machine
    pub fn request(&mut self, machine: usize) -> Acquire {
        self.resource.acquire(machine)
    }

    /// Finish the repair of `machine`, which must be the current occupant,
    /// and account for the time spent on it. Returns the next machine to
    /// service, if one was waiting.
    pub fn finish_repair(&mut self, machine: usize, busy_hours: f64) -> Option<usize> {
        assert_eq!(
            self.current_machine(),
            Some(machine),
            "worker {} finished machine {machine} it does not hold",
            self.id
        );
        self.total_busy_hours += busy_hours;
        self.repairs_completed += 1;
        self.resource.release().copied()
    }

    pub fn total_busy_hours(&self) -> f64 {
        self.total_busy_hours
    }

    pub fn repairs_completed(&self) -> u64 {
        self.repairs_completed
    }

    pub fn shift_state(&self) -> ShiftState {
        self.shift.state()
    }

    pub fn is_on_shift(&self) -> bool {
        self.shift.state() == ShiftState::Available
    }

    /// Enter the shift cycle; returns hours until the first shift change
    pub fn start_shift(&mut self, now: f64) -> f64 {
        self.shift.start(now)
    }

    /// Flip shift state; returns hours until the next shift change
    pub fn change_shift(&mut self) -> f64 {
        self.shift.advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker() -> Worker {
        Worker::new(WorkerId(0), MachineType::A, ShiftSchedule::default())
    }

    #[test]
    fn test_requests_queue_behind_current_repair() {
        let mut w = worker();
        assert_eq!(w.request(4), Acquire::Granted);
        assert_eq!(w.request(9), Acquire::Queued { position: 1 });
        assert!(w.is_busy());
        assert_eq!(w.current_machine(), Some(4));

        assert_eq!(w.finish_repair(4, 5.0), Some(9));
        assert_eq!(w.current_machine(), Some(9));
        assert_eq!(w.finish_repair(9, 2.5), None);

        assert!(!w.is_busy());
        assert_eq!(w.total_busy_hours(), 7.5);
        assert_eq!(w.repairs_completed(), 2);
    }

    #[test]
    #[should_panic(expected = "finished machine 9 it does not hold")]
    fn test_finishing_a_queued_machine_panics() {
        let mut w = worker();
        w.request(4);
        w.request(9);
        w.finish_repair(9, 1.0);
    }

    #[test]
    #[should_panic(expected = "finished machine 4 it does not hold")]
    fn test_finishing_when_idle_panics() {
        let mut w = worker();
        w.finish_repair(4, 1.0);
    }

    #[test]
    fn test_shift_changes() {
        let mut w = worker();
        assert_eq!(w.start_shift(0.0), 12.0);
        assert!(w.is_on_shift());

        assert_eq!(w.change_shift(), 36.0);
        assert_eq!(w.shift_state(), ShiftState::Resting);
        assert_eq!(w.change_shift(), 12.0);
        assert!(w.is_on_shift());
    }
}
