//! Capacity definition and bounds, shared by unit, storage energy, storage
//! power and transmission capacity.

use good_lp::{constraint, Constraint, Variable};
use ucx_core::CapacityBounds;

/// `cap = cap_new + inst-cap`, or `cap = inst-cap` without expansion.
pub fn capacity_definition(cap: Variable, new_cap: Option<Variable>, installed: f64) -> Constraint {
    match new_cap {
        Some(new_cap) => constraint!(cap == new_cap + installed),
        None => constraint!(cap == installed),
    }
}

/// `build·cap-lo ≤ cap ≤ build·cap-up`.
pub fn discrete_bounds(cap: Variable, build: Variable, bounds: &CapacityBounds) -> [Constraint; 2] {
    [
        constraint!(cap >= bounds.lo * build),
        constraint!(cap <= bounds.up * build),
    ]
}

/// `cap-lo ≤ cap ≤ cap-up`; an infinite upper bound is left open.
pub fn continuous_bounds(cap: Variable, bounds: &CapacityBounds) -> Vec<Constraint> {
    let mut constraints = vec![constraint!(cap >= bounds.lo)];
    if bounds.up.is_finite() {
        constraints.push(constraint!(cap <= bounds.up));
    }
    constraints
}

/// `tau ≤ cap·dt`
pub fn throughput_capacity(tau: Variable, cap: Variable, dt: f64) -> Constraint {
    constraint!(tau <= dt * cap)
}

/// Continuous minimum load for units without an operating state:
/// `tau ≥ min-fraction·cap·dt`.
pub fn throughput_floor(tau: Variable, cap: Variable, min_fraction: f64, dt: f64) -> Constraint {
    constraint!(tau >= min_fraction * dt * cap)
}
