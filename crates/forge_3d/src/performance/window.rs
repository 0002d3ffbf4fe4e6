//! Fixed-capacity rolling sample window

use std::collections::VecDeque;

/// FIFO window that evicts the oldest sample once full
#[derive(Clone, Debug)]
pub struct RollingWindow {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl RollingWindow {
    /// Create a window; a zero capacity is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Mean of the retained samples, `None` when empty
    pub fn average(&self) -> Option<f32> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f64 = self.samples.iter().map(|s| *s as f64).sum();
        Some((sum / self.samples.len() as f64) as f32)
    }

    pub fn latest(&self) -> Option<f32> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
