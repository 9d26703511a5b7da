//! Startup transients: the extra input energy spent at startup and the
//! tapered flow during the startup step.

use good_lp::{constraint, Constraint, Expression, Variable};

#[derive(Debug, Clone, Copy)]
pub struct StartupLossVars {
    pub loss: Variable,
    pub cap: Variable,
    pub startup: Variable,
}

#[derive(Debug, Clone, Copy)]
pub struct StartupLossParams {
    /// `start-up-energy·R`
    pub specific_loss: f64,
    /// `cap-up·start-up-energy·R`
    pub big_m: f64,
}

/// `loss = startup·specific_loss·cap`.
pub fn startup_loss(v: &StartupLossVars, p: &StartupLossParams) -> [Constraint; 4] {
    let m = p.big_m;
    [
        constraint!(v.loss - p.specific_loss * v.cap <= m - m * v.startup),
        constraint!(v.loss - p.specific_loss * v.cap >= -m + m * v.startup),
        constraint!(v.loss <= m * v.startup),
        constraint!(v.loss >= -m * v.startup),
    ]
}

/// The flow actually delivered (`e_out`, or `e_in − dt·startup_loss`) next
/// to the flow the unit would have without the taper.
#[derive(Debug, Clone)]
pub struct TaperVars {
    pub actual: Expression,
    pub no_start: Variable,
    pub startup: Variable,
}

#[derive(Debug, Clone, Copy)]
pub struct TaperParams {
    /// `(dt − start-up-duration)/dt`
    pub factor: f64,
    pub big_m: f64,
}

/// `actual = factor·no_start` in a startup step, `actual = no_start`
/// otherwise.
pub fn startup_taper(v: &TaperVars, p: &TaperParams) -> [Constraint; 4] {
    let m = p.big_m;
    let f = p.factor;
    [
        constraint!(v.actual.clone() - f * v.no_start <= m - m * v.startup),
        constraint!(v.actual.clone() - f * v.no_start >= -m + m * v.startup),
        constraint!(v.actual.clone() - v.no_start <= m * v.startup),
        constraint!(v.actual.clone() - v.no_start >= -m * v.startup),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::commitment::pin;
    use good_lp::solvers::microlp::microlp;
    use good_lp::{variable, variables, Solution, SolverModel};

    fn tapered_output(startup: f64) -> f64 {
        let mut vars = variables!();
        let out = vars.add(variable().min(0.0));
        let no_start = vars.add(variable().min(0.0));
        let start = vars.add(variable().binary());
        let v = TaperVars {
            actual: Expression::from(out),
            no_start,
            startup: start,
        };
        let p = TaperParams {
            factor: 0.5,
            big_m: 10.0,
        };
        let mut model = vars
            .maximise(out)
            .using(microlp)
            .with(pin(no_start, 8.0))
            .with(pin(start, startup));
        for c in startup_taper(&v, &p) {
            model = model.with(c);
        }
        model.solve().unwrap().value(out)
    }

    #[test]
    fn test_taper_halves_output_at_startup() {
        assert!((tapered_output(1.0) - 4.0).abs() < 1e-6);
        assert!((tapered_output(0.0) - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_startup_loss_only_at_startup() {
        for (startup, expected) in [(1.0, 2.0), (0.0, 0.0)] {
            let mut vars = variables!();
            let v = StartupLossVars {
                loss: vars.add(variable().min(-10.0).max(10.0)),
                cap: vars.add(variable().min(0.0)),
                startup: vars.add(variable().binary()),
            };
            let p = StartupLossParams {
                specific_loss: 0.2,
                big_m: 4.0,
            };
            let mut model = vars
                .maximise(v.loss)
                .using(microlp)
                .with(pin(v.cap, 10.0))
                .with(pin(v.startup, startup));
            for c in startup_loss(&v, &p) {
                model = model.with(c);
            }
            let loss = model.solve().unwrap().value(v.loss);
            assert!((loss - expected).abs() < 1e-6, "loss {} at startup={}", loss, startup);
        }
    }
}
