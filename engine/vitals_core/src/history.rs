use std::collections::VecDeque;

/// Samples retained when no capacity is configured
pub const DEFAULT_HISTORY_CAPACITY: usize = 60;

/// Bounded FIFO of heart-rate samples, oldest evicted first.
#[derive(Debug, Clone, PartialEq)]
pub struct HrHistoryBuffer {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl Default for HrHistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HrHistoryBuffer {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, returning the one evicted to make room.
    pub fn push(&mut self, sample: f64) -> Option<f64> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Chronological copy, most recent last
    pub fn snapshot(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }
}

impl Extend<f64> for HrHistoryBuffer {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for sample in iter {
            self.push(sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_when_full() {
        let mut buffer = HrHistoryBuffer::new(3);
        buffer.extend([70.0, 71.0, 72.0]);
        assert_eq!(buffer.push(73.0), Some(70.0));
        assert_eq!(buffer.snapshot(), vec![71.0, 72.0, 73.0]);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn zero_capacity_keeps_latest_sample() {
        let mut buffer = HrHistoryBuffer::new(0);
        buffer.push(70.0);
        buffer.push(80.0);
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.snapshot(), vec![80.0]);
    }

    #[test]
    fn default_capacity_matches_relay_window() {
        let mut buffer = HrHistoryBuffer::default();
        buffer.extend((0..100).map(f64::from));
        assert_eq!(buffer.len(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(buffer.snapshot().first(), Some(&40.0));
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
