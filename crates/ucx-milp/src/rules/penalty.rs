//! Gradient penalty slacks: the absolute throughput change of a step split
//! into a non-negative up and down part.

use good_lp::{constraint, Constraint, Variable};

#[derive(Debug, Clone, Copy)]
pub struct RampSlack {
    pub tau: Variable,
    pub prev_tau: Variable,
    pub up: Variable,
    pub down: Variable,
}

/// `tau[t] − tau[t−1] = up − down`
pub fn ramp_split(v: &RampSlack) -> Constraint {
    constraint!(v.tau - v.prev_tau == v.up - v.down)
}
