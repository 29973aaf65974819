//! Uniform time grid shared by every sampled series of one planning run.
use hifitime::{Duration, Epoch};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Strictly increasing, uniformly spaced sequence of sampling instants.
///
/// A single [TimeGrid] is shared (behind `Arc`) by all state series, masks
/// and contact data of one planning run, which is what keeps them aligned.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeGrid {
    start: Epoch,
    step: Duration,
    len: usize,
}

impl TimeGrid {
    /// Builds the grid covering `span` from `start` at `step` resolution.
    /// Both endpoints are grid points, so a 60 s span sampled at 15 s
    /// yields 5 instants.
    pub fn new(start: Epoch, span: Duration, step: Duration) -> Result<Self, ConfigError> {
        if step <= Duration::ZERO {
            return Err(ConfigError::NonPositiveTimeStep);
        }

        let steps = span.total_nanoseconds() / step.total_nanoseconds();
        if steps < 1 {
            return Err(ConfigError::EmptyTimeGrid);
        }

        Ok(Self {
            start,
            step,
            len: steps as usize + 1,
        })
    }

    /// Builds a grid of exactly `len` instants.
    pub fn from_points(start: Epoch, step: Duration, len: usize) -> Result<Self, ConfigError> {
        if step <= Duration::ZERO {
            return Err(ConfigError::NonPositiveTimeStep);
        }
        if len < 2 {
            return Err(ConfigError::EmptyTimeGrid);
        }
        Ok(Self { start, step, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn start(&self) -> Epoch {
        self.start
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Last grid instant.
    pub fn end(&self) -> Epoch {
        self.epoch_at(self.len - 1)
    }

    /// Instant of grid point `index`.
    pub fn epoch_at(&self, index: usize) -> Epoch {
        self.start + self.step * index as f64
    }

    /// All grid instants, in order.
    pub fn iter(&self) -> impl Iterator<Item = Epoch> + '_ {
        (0..self.len).map(|i| self.epoch_at(i))
    }

    /// Index of the first grid point strictly after `t`, if one exists.
    pub fn first_index_after(&self, t: Epoch) -> Option<usize> {
        if t < self.start {
            return Some(0);
        }

        let elapsed = (t - self.start).total_nanoseconds();
        let step = self.step.total_nanoseconds();
        let index = (elapsed / step + 1) as usize;

        if index < self.len {
            Some(index)
        } else {
            None
        }
    }
}
