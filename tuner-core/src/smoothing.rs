//! Exponential smoothing of successive frequency readings.
//!
//! See <https://en.wikipedia.org/wiki/Exponential_smoothing>.

use std::collections::VecDeque;

use crate::error::{Result, TunerError};

/// Default number of smoothed values kept in the history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 30;

/// Exponential moving average over a bounded history.
///
/// Stateful and order dependent. A single instance must not be fed from more
/// than one thread without external locking.
#[derive(Debug, Clone)]
pub struct Smoother {
    factor: f32,
    capacity: usize,
    history: VecDeque<f32>,
}

impl Smoother {
    /// Creates an empty smoother.
    ///
    /// # Arguments
    /// * `factor` - Weight of the newest value, in (0, 1]
    /// * `capacity` - Maximum history length, at least 1
    pub fn new(factor: f32, capacity: usize) -> Result<Self> {
        if !factor.is_finite() || factor <= 0.0 || factor > 1.0 {
            return Err(TunerError::InvalidConfig(format!(
                "smoothing factor {factor} is outside (0, 1]"
            )));
        }
        if capacity == 0 {
            return Err(TunerError::InvalidConfig(
                "history capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            factor,
            capacity,
            history: VecDeque::with_capacity(capacity),
        })
    }

    /// Blends `value` with the last smoothed value and records the result.
    ///
    /// With an empty history the value is returned unchanged.
    pub fn smooth(&mut self, value: f32) -> f32 {
        let smoothed = match self.history.back() {
            Some(&last) => self.factor * value + (1.0 - self.factor) * last,
            None => value,
        };

        while self.history.len() >= self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(smoothed);
        smoothed
    }

    /// Most recent smoothed value.
    pub fn last(&self) -> Option<f32> {
        self.history.back().copied()
    }

    /// Smoothed values, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Forgets all history.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}
