//! Outcome delivery ordering
//!
//! [`ReorderBuffer`] holds out-of-order arrivals in an index-keyed map and
//! releases them once every lower index has been released. [`Delivery`]
//! selects between that and plain completion order.

use std::collections::{HashMap, VecDeque};

/// Index-keyed buffer with a monotonically advancing cursor
#[derive(Debug)]
pub struct ReorderBuffer<V> {
    buffered: HashMap<usize, V>,
    cursor: usize,
}

impl<V> Default for ReorderBuffer<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ReorderBuffer<V> {
    pub fn new() -> Self {
        Self {
            buffered: HashMap::new(),
            cursor: 0,
        }
    }

    /// Store the value that arrived for `index`
    pub fn insert(&mut self, index: usize, value: V) {
        debug_assert!(
            index >= self.cursor && !self.buffered.contains_key(&index),
            "index {index} delivered twice"
        );
        self.buffered.insert(index, value);
    }

    /// Release the value at the cursor, if it has arrived
    pub fn pop_ready(&mut self) -> Option<V> {
        let value = self.buffered.remove(&self.cursor)?;
        self.cursor += 1;
        Some(value)
    }

    /// Next index the buffer is waiting for
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of values waiting on a lower index
    pub fn buffered(&self) -> usize {
        self.buffered.len()
    }
}

/// How settled outcomes are handed back to the caller
#[derive(Debug)]
pub enum Delivery<V> {
    /// Release in submission order
    Ordered(ReorderBuffer<V>),

    /// Release as soon as each outcome settles
    Completion,
}

impl<V> Delivery<V> {
    pub fn new(preserve_order: bool) -> Self {
        if preserve_order {
            Delivery::Ordered(ReorderBuffer::new())
        } else {
            Delivery::Completion
        }
    }

    /// Accept the value for `index`, pushing everything now releasable onto `ready`.
    ///
    /// Returns the number of values released.
    pub fn accept(&mut self, index: usize, value: V, ready: &mut VecDeque<V>) -> usize {
        match self {
            Delivery::Ordered(buffer) => {
                buffer.insert(index, value);
                let before = ready.len();
                while let Some(next) = buffer.pop_ready() {
                    ready.push_back(next);
                }
                ready.len() - before
            }
            Delivery::Completion => {
                ready.push_back(value);
                1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holds_until_cursor_arrives() {
        let mut buffer = ReorderBuffer::new();
        buffer.insert(2, "c");
        buffer.insert(1, "b");

        assert_eq!(buffer.pop_ready(), None);
        assert_eq!(buffer.buffered(), 2);

        buffer.insert(0, "a");
        assert_eq!(buffer.pop_ready(), Some("a"));
        assert_eq!(buffer.pop_ready(), Some("b"));
        assert_eq!(buffer.pop_ready(), Some("c"));
        assert_eq!(buffer.pop_ready(), None);
        assert_eq!(buffer.cursor(), 3);
    }

    #[test]
    fn test_ordered_delivery_drains_runs() {
        let mut delivery = Delivery::new(true);
        let mut ready = VecDeque::new();

        assert_eq!(delivery.accept(3, 'd', &mut ready), 0);
        assert_eq!(delivery.accept(1, 'b', &mut ready), 0);
        assert_eq!(delivery.accept(0, 'a', &mut ready), 2);
        assert_eq!(ready.drain(..).collect::<Vec<_>>(), vec!['a', 'b']);

        assert_eq!(delivery.accept(2, 'c', &mut ready), 2);
        assert_eq!(ready.drain(..).collect::<Vec<_>>(), vec!['c', 'd']);
    }

    #[test]
    fn test_ordered_delivery_reverse_arrival() {
        let mut delivery = Delivery::new(true);
        let mut ready = VecDeque::new();

        for index in (0..50).rev() {
            delivery.accept(index, index, &mut ready);
        }

        assert_eq!(ready.into_iter().collect::<Vec<_>>(), (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_completion_delivery_passes_through() {
        let mut delivery = Delivery::new(false);
        let mut ready = VecDeque::new();

        delivery.accept(2, 'c', &mut ready);
        delivery.accept(0, 'a', &mut ready);
        delivery.accept(1, 'b', &mut ready);

        assert_eq!(ready.into_iter().collect::<Vec<_>>(), vec!['c', 'a', 'b']);
    }
}
