//! Single-capacity resource with FIFO waiters
//!
//! Each worker owns one. `acquire` either grants the resource on the spot or
//! appends the requester to the wait queue. `release` hands the resource to
//! the oldest waiter and returns it; the caller is responsible for waking
//! that waiter on the next scheduler turn.

use std::collections::VecDeque;

/// Outcome of an acquire request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// Requester is now the occupant
    Granted,
    /// Requester waits; `position` is 1 for the head of the queue
    Queued { position: usize },
}

/// Exclusive (capacity 1) service point
#[derive(Debug, Clone)]
pub struct Resource<T> {
    occupant: Option<T>,
    waiters: VecDeque<T>,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Resource<T> {
    pub fn new() -> Self {
        Self {
            occupant: None,
            waiters: VecDeque::new(),
        }
    }

    /// Always 1
    pub fn capacity(&self) -> usize {
        1
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Number of current holders (0 or 1)
    pub fn count(&self) -> usize {
        usize::from(self.is_occupied())
    }

    pub fn occupant(&self) -> Option<&T> {
        self.occupant.as_ref()
    }

    pub fn queue_len(&self) -> usize {
        self.waiters.len()
    }

    pub fn acquire(&mut self, requester: T) -> Acquire {
        if self.occupant.is_none() {
            self.occupant = Some(requester);
            Acquire::Granted
        } else {
            self.waiters.push_back(requester);
            Acquire::Queued {
                position: self.waiters.len(),
            }
        }
    }

    /// Release the resource; returns the waiter promoted to occupant, if any
    ///
    /// # Panics
    /// If the resource is not occupied.
    pub fn release(&mut self) -> Option<&T> {
        assert!(self.occupant.is_some(), "release of an unoccupied resource");
        self.occupant = self.waiters.pop_front();
        self.occupant.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_free_resource() {
        let mut resource = Resource::new();
        assert_eq!(resource.count(), 0);

        assert_eq!(resource.acquire("A1"), Acquire::Granted);
        assert!(resource.is_occupied());
        assert_eq!(resource.occupant(), Some(&"A1"));
        assert_eq!(resource.count(), resource.capacity());
    }

    #[test]
    fn test_release_promotes_waiters_fifo() {
        let mut resource = Resource::new();
        resource.acquire(1);
        assert_eq!(resource.acquire(2), Acquire::Queued { position: 1 });
        assert_eq!(resource.acquire(3), Acquire::Queued { position: 2 });
        assert_eq!(resource.queue_len(), 2);

        assert_eq!(resource.release(), Some(&2));
        assert_eq!(resource.occupant(), Some(&2));
        assert_eq!(resource.queue_len(), 1);

        assert_eq!(resource.release(), Some(&3));
        assert_eq!(resource.release(), None);
        assert!(!resource.is_occupied());
    }

    #[test]
    fn test_released_resource_can_be_reacquired() {
        let mut resource = Resource::new();
        resource.acquire('x');
        resource.release();
        assert_eq!(resource.acquire('y'), Acquire::Granted);
    }

    #[test]
    #[should_panic(expected = "unoccupied")]
    fn test_release_unoccupied_panics() {
        let mut resource: Resource<u32> = Resource::new();
        resource.release();
    }
}
