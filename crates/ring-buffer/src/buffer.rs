//! Bounded Reading History

use crate::Reading;
use std::collections::VecDeque;

/// Default history capacity (most recent 50 readings)
pub const DEFAULT_CAPACITY: usize = 50;

/// Bounded FIFO of the most recent readings.
///
/// Length never exceeds the capacity; when full the oldest reading is
/// evicted first. The whole content can be swapped out with `replace`.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    /// Readings, oldest first
    storage: VecDeque<Reading>,
    /// Capacity of the buffer
    capacity: usize,
    /// Total readings pushed (for statistics)
    total_written: usize,
}

impl RingBuffer {
    /// Create a new buffer with given capacity (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            storage: VecDeque::with_capacity(capacity),
            capacity,
            total_written: 0,
        }
    }

    /// Create a buffer with default capacity (50 readings)
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Push a reading (evicts the oldest if full)
    pub fn push(&mut self, reading: Reading) {
        if self.storage.len() == self.capacity {
            self.storage.pop_front();
        }
        self.storage.push_back(reading);
        self.total_written += 1;
    }

    /// Push unless the reading is the same instance as the newest entry.
    ///
    /// Returns whether the reading was appended.
    pub fn push_unique(&mut self, reading: &Reading) -> bool {
        if self.ends_with(reading) {
            return false;
        }
        self.push(reading.clone());
        true
    }

    /// Replace the whole content with the last `capacity` readings of `readings`
    pub fn replace(&mut self, readings: &[Reading]) {
        let start = readings.len().saturating_sub(self.capacity);
        self.storage.clear();
        self.storage.extend(readings[start..].iter().cloned());
    }

    /// Whether the newest entry is this reading instance
    pub fn ends_with(&self, reading: &Reading) -> bool {
        self.storage
            .back()
            .map(|last| last.same_instance(reading))
            .unwrap_or(false)
    }

    /// Newest entry
    pub fn latest(&self) -> Option<&Reading> {
        self.storage.back()
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.storage.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get fill ratio (0.0 to 1.0)
    pub fn fill_ratio(&self) -> f64 {
        self.len() as f64 / self.capacity as f64
    }

    /// Read the last N readings in chronological order (oldest first)
    pub fn read_last(&self, count: usize) -> Vec<Reading> {
        let start = self.storage.len().saturating_sub(count);
        self.storage.iter().skip(start).cloned().collect()
    }

    /// All readings, oldest first
    pub fn to_vec(&self) -> Vec<Reading> {
        self.storage.iter().cloned().collect()
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, Reading> {
        self.storage.iter()
    }

    /// Get total readings written (for statistics)
    pub fn total_written(&self) -> usize {
        self.total_written
    }

    pub fn clear(&mut self) {
        self.storage.clear();
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}
