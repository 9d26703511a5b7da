//! Operating-state transitions and the run coupling of throughput.

use good_lp::{constraint, Constraint, Expression, Variable};

/// State variables of one unit at one modeled step.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub prev_run: Variable,
    pub run: Variable,
    pub startup: Variable,
    pub turnoff: Variable,
}

/// `startup = 1` exactly when the unit goes from off to on.
pub fn startup_detection(v: &Transition) -> [Constraint; 3] {
    [
        constraint!(v.startup >= v.run - v.prev_run),
        constraint!(v.startup <= v.run),
        constraint!(v.startup <= 1.0 - Expression::from(v.prev_run)),
    ]
}

/// `turnoff = 1` exactly when the unit goes from on to off.
pub fn turnoff_detection(v: &Transition) -> [Constraint; 3] {
    [
        constraint!(v.turnoff >= v.prev_run - v.run),
        constraint!(v.turnoff <= 1.0 - Expression::from(v.run)),
        constraint!(v.turnoff <= v.prev_run),
    ]
}

#[derive(Debug, Clone, Copy)]
pub struct ThroughputVars {
    pub tau: Variable,
    pub run: Variable,
    pub cap: Variable,
}

#[derive(Debug, Clone, Copy)]
pub struct ThroughputParams {
    pub min_fraction: f64,
    pub dt: f64,
    /// `cap-up·dt`
    pub big_m: f64,
}

/// `tau ≤ run·cap-up·dt`, so a stopped unit has no throughput.
pub fn throughput_max(v: &ThroughputVars, p: &ThroughputParams) -> Constraint {
    constraint!(v.tau <= p.big_m * v.run)
}

/// `tau ≥ min-fraction·cap·dt` while running, relaxed by `cap-up·dt` when
/// stopped.
pub fn throughput_min(v: &ThroughputVars, p: &ThroughputParams) -> Constraint {
    let floor = p.min_fraction * p.dt;
    constraint!(v.tau - floor * v.cap >= -p.big_m + p.big_m * v.run)
}

/// Pin a variable to a value (initial state, pre-active window).
pub fn pin(var: Variable, value: f64) -> Constraint {
    constraint!(var == value)
}
