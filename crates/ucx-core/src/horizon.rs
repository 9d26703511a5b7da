//! Ordered timesteps of a model run.
//!
//! Position 0 is the initial step `t0`, which carries the starting operating
//! state and throughput but is not itself modeled. Positions `1..=steps` are
//! the modeled steps. Labels are `start + position`.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Timestep set and step length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Horizon {
    /// Label of the initial step `t0`
    #[serde(default)]
    pub start: u32,
    /// Number of modeled steps after `t0`
    pub steps: usize,
    /// Step length in hours
    #[serde(default = "default_dt")]
    pub dt: f64,
}

fn default_dt() -> f64 {
    1.0
}

impl Horizon {
    pub fn new(steps: usize, dt: f64) -> Self {
        Self {
            start: 0,
            steps,
            dt,
        }
    }

    pub fn starting_at(mut self, start: u32) -> Self {
        self.start = start;
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.steps == 0 {
            return Err(ModelError::Horizon(
                "at least one modeled step is required".to_string(),
            ));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ModelError::Horizon(format!(
                "dt must be positive, got {}",
                self.dt
            )));
        }
        Ok(())
    }

    /// Number of positions including `t0`.
    pub fn len(&self) -> usize {
        self.steps + 1
    }

    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }

    /// All positions, `t0` first.
    pub fn positions(&self) -> std::ops::RangeInclusive<usize> {
        0..=self.steps
    }

    /// Modeled positions (everything after `t0`).
    pub fn modeled(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.steps
    }

    pub fn label(&self, position: usize) -> u32 {
        self.start + position as u32
    }

    /// Position of a timestep label, if it lies inside the horizon.
    pub fn position(&self, label: u32) -> Option<usize> {
        let position = label.checked_sub(self.start)? as usize;
        (position <= self.steps).then_some(position)
    }
}
