//! Ramp-rate limits on throughput between consecutive steps.

use good_lp::{constraint, Constraint, Variable};

#[derive(Debug, Clone, Copy)]
pub struct RampVars {
    pub tau: Variable,
    pub prev_tau: Variable,
    pub cap: Variable,
}

#[derive(Debug, Clone, Copy)]
pub struct RampParams {
    pub max_grad: f64,
    pub dt: f64,
}

/// `tau[t−1] − cap·g·dt ≤ tau[t] ≤ tau[t−1] + cap·g·dt`.
pub fn plain_ramp(v: &RampVars, p: &RampParams) -> [Constraint; 2] {
    let step = p.max_grad * p.dt;
    [
        constraint!(v.tau <= v.prev_tau + step * v.cap),
        constraint!(v.tau >= v.prev_tau - step * v.cap),
    ]
}

#[derive(Debug, Clone, Copy)]
pub struct RampTransitions {
    pub startup: Variable,
    pub turnoff: Variable,
}

#[derive(Debug, Clone, Copy)]
pub struct ExceptionParams {
    pub max_grad: f64,
    pub min_fraction: f64,
    pub dt: f64,
    /// `cap-up·dt`
    pub big_m: f64,
}

/// Ramp limits relaxed at startup and turnoff, plus the startup floor
/// `tau = min-fraction·cap·dt` in a startup step.
///
/// The upper limit is lifted by `startup·M`, the lower one by `turnoff·M`.
pub fn ramp_with_exceptions(
    v: &RampVars,
    t: &RampTransitions,
    p: &ExceptionParams,
) -> [Constraint; 4] {
    let step = p.max_grad * p.dt;
    let floor = p.min_fraction * p.dt;
    let m = p.big_m;
    [
        constraint!(v.tau - v.prev_tau - step * v.cap <= m * t.startup),
        constraint!(v.tau - v.prev_tau + step * v.cap >= -m * t.turnoff),
        constraint!(v.tau - floor * v.cap <= m - m * t.startup),
        constraint!(v.tau - floor * v.cap >= -m + m * t.startup),
    ]
}
