//! Dispatch of a failed machine to a repair worker
//!
//! Candidates are the workers trained for the machine's type, in
//! configuration order. Both strategies take the first free worker in that
//! order. They differ only when every candidate is busy:
//!
//! - **FirstListed**: queue on the first listed worker, whatever its backlog
//! - **LeastQueued**: queue on the worker with the shortest waiter queue
//!   (ties go to the earlier listed worker)
//!
//! Exactly one worker is engaged per repair. A queued machine never moves to
//! another worker while it waits.

use serde::{Deserialize, Serialize};

/// Dispatch strategy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DispatchStrategy {
    /// Free worker in list order, else the first listed worker
    #[default]
    FirstListed,

    /// Free worker in list order, else the shortest queue
    LeastQueued,
}

impl std::str::FromStr for DispatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "first-listed" | "first" => Ok(Self::FirstListed),
            "least-queued" | "shortest-queue" => Ok(Self::LeastQueued),
            other => Err(format!("unknown dispatch strategy: {other}")),
        }
    }
}

/// Snapshot of one worker's resource at dispatch time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchCandidate {
    /// Worker arena index
    pub worker: usize,
    pub occupied: bool,
    pub queue_len: usize,
}

impl DispatchCandidate {
    pub fn new(worker: usize) -> Self {
        Self {
            worker,
            occupied: false,
            queue_len: 0,
        }
    }

    pub fn busy(mut self, queue_len: usize) -> Self {
        self.occupied = true;
        self.queue_len = queue_len;
        self
    }
}

/// Picks the worker that will service a failed machine
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher {
    strategy: DispatchStrategy,
}

impl Dispatcher {
    pub fn new(strategy: DispatchStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> DispatchStrategy {
        self.strategy
    }

    /// Select a worker arena index, or `None` if the type has no workers
    pub fn select(&self, candidates: &[DispatchCandidate]) -> Option<usize> {
        if let Some(free) = candidates.iter().find(|c| !c.occupied) {
            return Some(free.worker);
        }

        match self.strategy {
            DispatchStrategy::FirstListed => candidates.first().map(|c| c.worker),
            // min_by_key keeps the first of equal minima
            DispatchStrategy::LeastQueued => candidates
                .iter()
                .min_by_key(|c| c.queue_len)
                .map(|c| c.worker),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_free_worker_wins() {
        let candidates = vec![
            DispatchCandidate::new(0).busy(0),
            DispatchCandidate::new(3),
            DispatchCandidate::new(5),
        ];

        for strategy in [DispatchStrategy::FirstListed, DispatchStrategy::LeastQueued] {
            let dispatcher = Dispatcher::new(strategy);
            assert_eq!(dispatcher.select(&candidates), Some(3));
        }
    }

    #[test]
    fn test_all_busy_falls_back_to_first_listed() {
        let candidates = vec![
            DispatchCandidate::new(0).busy(4),
            DispatchCandidate::new(3).busy(0),
        ];

        let dispatcher = Dispatcher::default();
        assert_eq!(dispatcher.strategy(), DispatchStrategy::FirstListed);
        assert_eq!(dispatcher.select(&candidates), Some(0));
    }

    #[test]
    fn test_least_queued_picks_shortest_backlog() {
        let candidates = vec![
            DispatchCandidate::new(0).busy(4),
            DispatchCandidate::new(3).busy(1),
            DispatchCandidate::new(5).busy(1),
        ];

        let dispatcher = Dispatcher::new(DispatchStrategy::LeastQueued);
        assert_eq!(dispatcher.select(&candidates), Some(3));
    }

    #[test]
    fn test_no_candidates() {
        let dispatcher = Dispatcher::default();
        assert_eq!(dispatcher.select(&[]), None);
    }

    #[test]
    fn test_strategy_parsing_and_serialization() {
        assert_eq!("least-queued".parse::<DispatchStrategy>(), Ok(DispatchStrategy::LeastQueued));
        assert_eq!("first-listed".parse::<DispatchStrategy>(), Ok(DispatchStrategy::FirstListed));
        assert!("round-robin".parse::<DispatchStrategy>().is_err());

        let json = serde_json::to_string(&DispatchStrategy::LeastQueued).unwrap();
        assert_eq!(json, "\"LeastQueued\"");
    }
}
