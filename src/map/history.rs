//! Visit history for loop-avoidance scoring.

use std::collections::VecDeque;

use serde::Serialize;

/// One recorded visit: grid cell plus UNIX timestamp in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Visit {
    pub x: usize,
    pub y: usize,
    pub timestamp: f64,
}

/// Bounded FIFO of recently visited cells.
///
/// Only consulted by the frontier scoring; the oldest entry is evicted
/// once `capacity` is reached.
#[derive(Clone, Debug)]
pub struct VisitHistory {
    entries: VecDeque<Visit>,
    capacity: usize,
}

impl VisitHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a visit, evicting the oldest entry when full.
    pub fn record(&mut self, x: usize, y: usize, timestamp: f64) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Visit { x, y, timestamp });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count occurrences of `(x, y)` among the last `window` entries.
    pub fn count_recent(&self, x: usize, y: usize, window: usize) -> usize {
        self.entries
            .iter()
            .rev()
            .take(window)
            .filter(|v| v.x == x && v.y == y)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Visit> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eviction_at_capacity() {
        let mut history = VisitHistory::new(3);
        for i in 0..5 {
            history.record(i, 0, i as f64);
        }

        assert_eq!(history.len(), 3);
        // Oldest two evicted
        assert_eq!(history.count_recent(0, 0, 3), 0);
        assert_eq!(history.count_recent(1, 0, 3), 0);
        assert_eq!(history.count_recent(4, 0, 3), 1);
    }

    #[test]
    fn test_count_recent_window() {
        let mut history = VisitHistory::new(100);
        history.record(1, 1, 0.0);
        history.record(2, 2, 1.0);
        history.record(1, 1, 2.0);
        history.record(3, 3, 3.0);

        // Full window sees both (1,1) visits
        assert_eq!(history.count_recent(1, 1, 4), 2);
        // A window of 2 only sees the last two entries
        assert_eq!(history.count_recent(1, 1, 2), 1);
        assert_eq!(history.count_recent(2, 2, 2), 0);
    }
}
