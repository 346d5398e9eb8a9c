//! Event clock and pending-continuation queue
//!
//! The scheduler owns simulated time. Tasks never run on their own: they
//! register a continuation to be resumed after a delay, and the run loop pops
//! one continuation at a time in `(time, insertion order)` order. Events at
//! the same instant therefore resume first-scheduled, first-resumed.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Timed continuation wrapper for priority queue ordering
#[derive(Debug)]
struct TimedEvent<E> {
    time: f64,
    seq: u64,
    continuation: E,
}

// Priority queue orders by time, then by sequence (earliest first)
impl<E> Ord for TimedEvent<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse comparison for min-heap (BinaryHeap is max-heap by default)
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<E> PartialOrd for TimedEvent<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Eq for TimedEvent<E> {}

impl<E> PartialEq for TimedEvent<E> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

/// Discrete-event scheduler over continuations of type `E`
#[derive(Debug)]
pub struct Scheduler<E> {
    now: f64,
    next_seq: u64,
    queue: BinaryHeap<TimedEvent<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Scheduler {
            now: 0.0,
            next_seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current simulated time (hours)
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of pending events
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Time of the earliest pending event
    pub fn peek_time(&self) -> Option<f64> {
        self.queue.peek().map(|e| e.time)
    }

    /// Resume `continuation` at `now + delay`
    ///
    /// # Panics
    /// If `delay` is negative or not finite.
    pub fn schedule_after(&mut self, delay: f64, continuation: E) {
        assert!(
            delay.is_finite() && delay >= 0.0,
            "scheduler: invalid delay {delay} at t={}",
            self.now
        );
        self.push(self.now + delay, continuation);
    }

    /// Resume `continuation` at absolute time `time`
    ///
    /// # Panics
    /// If `time` lies in the past.
    pub fn schedule_at(&mut self, time: f64, continuation: E) {
        assert!(
            time.is_finite() && time >= self.now,
            "scheduler: cannot schedule at {time}, clock is already at {}",
            self.now
        );
        self.push(time, continuation);
    }

    fn push(&mut self, time: f64, continuation: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(TimedEvent {
            time,
            seq,
            continuation,
        });
    }

    /// Pop the earliest event due at or before `until`, advancing the clock
    pub fn pop_until(&mut self, until: f64) -> Option<E> {
        if self.peek_time()? > until {
            return None;
        }
        let event = self.queue.pop()?;
        debug_assert!(event.time >= self.now, "scheduler: clock moved backward");
        self.now = event.time;
        Some(event.continuation)
    }

    /// Move the clock forward to `until` once nothing else is due
    pub fn advance_to(&mut self, until: f64) {
        if until > self.now {
            self.now = until;
        }
    }
}
