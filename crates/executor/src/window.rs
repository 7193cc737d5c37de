//! Admission window
//!
//! Tracks which tasks may start. Tasks are admitted strictly by ascending
//! index while fewer than `capacity` are in flight; every settlement frees one
//! slot that the next admission can take immediately.

use std::collections::VecDeque;

/// Sliding admission window over an indexed task queue
#[derive(Debug)]
pub struct AdmissionWindow<F> {
    pending: VecDeque<(usize, F)>,
    capacity: usize,
    in_flight: usize,
    settled: usize,
    total: usize,
}

impl<F> AdmissionWindow<F> {
    /// Create a window over `tasks` allowing `capacity` tasks in flight.
    ///
    /// Tasks are indexed by their position in the iterator.
    pub fn new<I>(tasks: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = F>,
    {
        let pending: VecDeque<(usize, F)> = tasks.into_iter().enumerate().collect();
        let total = pending.len();
        Self {
            pending,
            capacity,
            in_flight: 0,
            settled: 0,
            total,
        }
    }

    /// Take the next task if a slot is free
    pub fn admit(&mut self) -> Option<(usize, F)> {
        if self.in_flight >= self.capacity {
            return None;
        }
        let next = self.pending.pop_front()?;
        self.in_flight += 1;
        Some(next)
    }

    /// Record that an in-flight task has settled
    pub fn settle(&mut self) {
        debug_assert!(self.in_flight > 0, "settle without an in-flight task");
        self.in_flight = self.in_flight.saturating_sub(1);
        self.settled += 1;
    }

    /// Drop every task that has not started yet, returning how many were dropped
    pub fn close(&mut self) -> usize {
        let skipped = self.pending.len();
        self.pending.clear();
        skipped
    }

    /// Number of tasks started but not yet settled
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Number of tasks not yet started
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Number of tasks that have settled
    pub fn settled(&self) -> usize {
        self.settled
    }

    /// Number of tasks the window was created with
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of free slots
    pub fn available_slots(&self) -> usize {
        self.capacity.saturating_sub(self.in_flight)
    }

    /// True once nothing is pending and nothing is in flight
    pub fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.in_flight == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_up_to_capacity() {
        let mut window = AdmissionWindow::new(vec!['a', 'b', 'c', 'd'], 2);

        assert_eq!(window.admit(), Some((0, 'a')));
        assert_eq!(window.admit(), Some((1, 'b')));
        assert_eq!(window.admit(), None);
        assert_eq!(window.in_flight(), 2);
        assert_eq!(window.pending(), 2);
        assert_eq!(window.available_slots(), 0);
    }

    #[test]
    fn test_settle_frees_exactly_one_slot() {
        let mut window = AdmissionWindow::new(vec!['a', 'b', 'c', 'd'], 2);
        window.admit();
        window.admit();

        window.settle();
        assert_eq!(window.available_slots(), 1);
        assert_eq!(window.admit(), Some((2, 'c')));
        assert_eq!(window.admit(), None);
        assert_eq!(window.settled(), 1);
    }

    #[test]
    fn test_drains_in_index_order() {
        let mut window = AdmissionWindow::new(0..5, 3);
        let mut order = Vec::new();

        while !window.is_drained() {
            while let Some((index, _)) = window.admit() {
                order.push(index);
            }
            window.settle();
        }

        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        assert_eq!(window.settled(), 5);
        assert_eq!(window.total(), 5);
    }

    #[test]
    fn test_empty_window_is_drained() {
        let mut window: AdmissionWindow<()> = AdmissionWindow::new(Vec::new(), 0);
        assert!(window.is_drained());
        assert_eq!(window.admit(), None);
        assert_eq!(window.total(), 0);
    }

    #[test]
    fn test_close_drops_pending() {
        let mut window = AdmissionWindow::new(vec![1, 2, 3, 4, 5], 2);
        window.admit();
        window.admit();

        assert_eq!(window.close(), 3);
        assert_eq!(window.pending(), 0);
        assert_eq!(window.in_flight(), 2);
        assert!(!window.is_drained());

        window.settle();
        assert_eq!(window.admit(), None);
    }
}
