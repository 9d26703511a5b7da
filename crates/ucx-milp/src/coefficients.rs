//! Part-load flow coefficients.
//!
//! A part-load ratio interpolates linearly between `ratio-min` at minimum load
//! and `ratio` at full load. Written as `e = cap·offset_spec·dt + slope·tau`
//! while running, the two coefficients follow from matching both ends:
//!
//! ```text
//! slope       = (R − mf·r) / (1 − mf)
//! offset_spec = R − slope
//! ```

use ucx_core::{ModelError, ModelResult};

/// Slope and per-capacity offset of one part-load ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartLoadCoefficients {
    pub slope: f64,
    pub offset_spec: f64,
}

impl PartLoadCoefficients {
    /// Flow at throughput `tau` and capacity `cap` while running.
    pub fn flow(&self, cap: f64, tau: f64, dt: f64) -> f64 {
        cap * self.offset_spec * dt + self.slope * tau
    }
}

/// Derive coefficients from full-load ratio `r_full`, minimum-load ratio
/// `r_min` and `min_fraction`. `unit` only labels the error.
pub fn derive(
    unit: &str,
    r_full: f64,
    r_min: f64,
    min_fraction: f64,
) -> ModelResult<PartLoadCoefficients> {
    if !(0.0..1.0).contains(&min_fraction) {
        return Err(ModelError::DegeneratePartLoad {
            unit: unit.to_string(),
            value: min_fraction,
        });
    }
    let slope = (r_full - min_fraction * r_min) / (1.0 - min_fraction);
    Ok(PartLoadCoefficients {
        slope,
        offset_spec: r_full - slope,
    })
}
