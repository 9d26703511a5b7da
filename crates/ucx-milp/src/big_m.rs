//! Big-M constants, one named constructor per constraint family.
//!
//! Each constant must bound the quantity it relaxes for every capacity up to
//! `cap-up`, and should be no larger than that: loose constants weaken the LP
//! relaxation and amplify integrality-tolerance errors. Every constant used in
//! an assembled model is recorded as a [`BigMEntry`] for review.

use serde::Serialize;

use crate::model::ConstraintFamily;

/// Throughput per step: `cap-up·dt`. Used for the run coupling of `tau`.
pub fn throughput(cap_up: f64, dt: f64) -> f64 {
    cap_up * dt
}

/// Part-load offset helper: bounds `offset_spec·cap` and the flow scale `R`.
pub fn offset(cap_up: f64, ratio: f64, offset_spec: f64) -> f64 {
    cap_up * ratio.max(offset_spec.abs())
}

/// Startup loss helper: `cap-up·start-up-energy·R`.
pub fn startup_loss(cap_up: f64, start_up_energy: f64, ratio: f64) -> f64 {
    cap_up * start_up_energy * ratio
}

/// Startup taper: the largest flow of the ratio within one step.
/// `peak_ratio` is `max(R, min-fraction·r)`, the ratio at the load where the
/// part-load flow peaks.
pub fn startup_taper(cap_up: f64, peak_ratio: f64, dt: f64) -> f64 {
    cap_up * dt * peak_ratio
}

/// Ramp exceptions at startup and turnoff: `cap-up·dt`.
pub fn ramp(cap_up: f64, dt: f64) -> f64 {
    cap_up * dt
}

/// One big-M constant of an assembled model.
#[derive(Debug, Clone, Serialize)]
pub struct BigMEntry {
    pub family: ConstraintFamily,
    pub entity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commodity: Option<String>,
    pub value: f64,
}
