//! Minimum consecutive run duration.
//!
//! A boolean `w[t]` is forced to 1 when the unit was off in any of the
//! previous `n'` steps. A unit that ran in `t−1` with `w[t] = 1` started
//! inside the window and must keep running in `t`. Only after `n` running
//! steps can `w[t]` drop to 0 and release the unit.

use good_lp::{constraint, Constraint, Expression, Variable};

#[derive(Debug, Clone)]
pub struct UptimeWindow<'a> {
    pub window: Variable,
    pub run: Variable,
    pub prev_run: Variable,
    /// `run[t−1] .. run[t−n']`, nearest first
    pub history: &'a [Variable],
}

/// `n'·w ≥ Σ (1 − run[t−i])` and `run[t] ≥ w − (1 − run[t−1])`.
///
/// Returns an empty list for an empty history.
pub fn uptime_window(v: &UptimeWindow<'_>) -> Vec<Constraint> {
    if v.history.is_empty() {
        return Vec::new();
    }
    let n = v.history.len() as f64;
    let mut ran = Expression::from(0.0);
    for run in v.history {
        ran += *run;
    }
    vec![
        constraint!(n * v.window >= n - ran),
        constraint!(v.run >= v.window + v.prev_run - 1.0),
    ]
}

/// Window length at a modeled position: `min(n, position)`.
pub fn window_len(min_uptime: usize, position: usize) -> usize {
    min_uptime.min(position)
}
