//! Part-load flows.
//!
//! The offset term `offset_spec·cap` is a product of a constant and the
//! capacity variable, switched by `run`. It is linearised with a sign-free
//! helper `offset` that equals `offset_spec·cap` while running and 0 while
//! stopped.

use good_lp::{constraint, Constraint, Expression, Variable};

#[derive(Debug, Clone, Copy)]
pub struct OffsetVars {
    pub offset: Variable,
    pub cap: Variable,
    pub run: Variable,
}

#[derive(Debug, Clone, Copy)]
pub struct OffsetParams {
    pub offset_spec: f64,
    pub big_m: f64,
}

/// `offset = run·offset_spec·cap`, four big-M inequalities.
pub fn offset_linearisation(v: &OffsetVars, p: &OffsetParams) -> [Constraint; 4] {
    let m = p.big_m;
    [
        constraint!(v.offset - p.offset_spec * v.cap <= m - m * v.run),
        constraint!(v.offset - p.offset_spec * v.cap >= -m + m * v.run),
        constraint!(v.offset <= m * v.run),
        constraint!(v.offset >= -m * v.run),
    ]
}

/// Flow of a part-load ratio without startup effects:
/// `dt·offset + slope·tau`.
pub fn part_load_expression(offset: Variable, tau: Variable, slope: f64, dt: f64) -> Expression {
    dt * offset + slope * tau
}

/// `flow = dt·offset + slope·tau (+ dt·startup_loss)`.
pub fn part_load_flow(
    flow: Variable,
    offset: Variable,
    tau: Variable,
    slope: f64,
    dt: f64,
    startup_loss: Option<Variable>,
) -> Constraint {
    let mut rhs = part_load_expression(offset, tau, slope, dt);
    if let Some(loss) = startup_loss {
        rhs += dt * loss;
    }
    constraint!(flow == rhs)
}

/// Part-load flow of a unit that is always online: the offset scales with
/// capacity directly, `flow = dt·offset_spec·cap + slope·tau`.
pub fn always_on_flow(
    flow: Variable,
    cap: Variable,
    tau: Variable,
    offset_spec: f64,
    slope: f64,
    dt: f64,
) -> Constraint {
    constraint!(flow == dt * offset_spec * cap + slope * tau)
}

/// `flow = R·tau`
pub fn linear_flow(flow: Variable, tau: Variable, ratio: f64) -> Constraint {
    constraint!(flow == ratio * tau)
}

/// Declares `target` equal to an expression, e.g. the untapered flow.
pub fn defines(target: Variable, value: Expression) -> Constraint {
    constraint!(target == value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::derive;
    use crate::rules::commitment::pin;
    use good_lp::solvers::microlp::microlp;
    use good_lp::{variable, variables, Solution, SolverModel};

    fn solve_offset(run: f64, offset_spec: f64) -> (f64, f64) {
        let mut results = Vec::new();
        for maximise in [false, true] {
            let mut vars = variables!();
            let v = OffsetVars {
                offset: vars.add(variable().min(-100.0).max(100.0)),
                cap: vars.add(variable().min(0.0)),
                run: vars.add(variable().binary()),
            };
            let p = OffsetParams {
                offset_spec,
                big_m: 20.0,
            };
            let problem = if maximise {
                vars.maximise(v.offset)
            } else {
                vars.minimise(v.offset)
            };
            let mut model = problem
                .using(microlp)
                .with(pin(v.cap, 10.0))
                .with(pin(v.run, run));
            for c in offset_linearisation(&v, &p) {
                model = model.with(c);
            }
            results.push(model.solve().unwrap().value(v.offset));
        }
        (results[0], results[1])
    }

    #[test]
    fn test_offset_follows_run() {
        let (lo, hi) = solve_offset(1.0, 0.5);
        assert!((lo - 5.0).abs() < 1e-6 && (hi - 5.0).abs() < 1e-6, "{} {}", lo, hi);

        let (lo, hi) = solve_offset(1.0, -0.5);
        assert!((lo + 5.0).abs() < 1e-6 && (hi + 5.0).abs() < 1e-6, "{} {}", lo, hi);

        let (lo, hi) = solve_offset(0.0, 0.5);
        assert!(lo.abs() < 1e-6 && hi.abs() < 1e-6, "{} {}", lo, hi);
    }

    #[test]
    fn test_always_on_flow_at_min_load() {
        let c = derive("u", 1.0, 1.5, 0.3).unwrap();
        let mut vars = variables!();
        let flow = vars.add(variable().min(0.0));
        let cap = vars.add(variable().min(0.0));
        let tau = vars.add(variable().min(0.0));
        let solution = vars
            .minimise(flow)
            .using(microlp)
            .with(always_on_flow(flow, cap, tau, c.offset_spec, c.slope, 1.0))
            .with(pin(cap, 10.0))
            .with(pin(tau, 3.0))
            .solve()
            .unwrap();
        // 1.5 · 0.3 · 10
        assert!((solution.value(flow) - 4.5).abs() < 1e-6, "flow {}", solution.value(flow));
    }
}
