//! Solver adapter: hands an assembled model to a `good_lp` backend.
//!
//! `microlp` (pure Rust, branch and bound) is always available. `clarabel`
//! solves the LP relaxation only; `highs` sits behind the `solver-highs`
//! cargo feature.

use std::str::FromStr;

use good_lp::{Constraint, ResolutionError, Solution, SolverModel, Variable};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use web_time::Instant;
use ucx_core::{EnergySystem, ModelError};

use crate::model::{AssembledModel, ConstraintFamily, ModelBuilder};
use crate::solution::{ModelSolution, SolveStatus};

/// Supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilpSolverKind {
    #[default]
    Microlp,
    #[cfg(feature = "solver-clarabel")]
    Clarabel,
    #[cfg(feature = "solver-highs")]
    Highs,
}

const AVAILABLE_SOLVERS: &[&str] = &[
    "microlp",
    #[cfg(feature = "solver-clarabel")]
    "clarabel",
    #[cfg(feature = "solver-highs")]
    "highs",
];

impl MilpSolverKind {
    pub fn available() -> &'static [&'static str] {
        AVAILABLE_SOLVERS
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MilpSolverKind::Microlp => "microlp",
            #[cfg(feature = "solver-clarabel")]
            MilpSolverKind::Clarabel => "clarabel",
            #[cfg(feature = "solver-highs")]
            MilpSolverKind::Highs => "highs",
        }
    }

    /// Whether the backend honours integer variables.
    pub fn supports_integers(&self) -> bool {
        match self {
            MilpSolverKind::Microlp => true,
            #[cfg(feature = "solver-clarabel")]
            MilpSolverKind::Clarabel => false,
            #[cfg(feature = "solver-highs")]
            MilpSolverKind::Highs => true,
        }
    }
}

impl std::fmt::Display for MilpSolverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn unknown_solver_error(label: &str) -> SolveError {
    SolveError::UnknownSolver {
        label: label.to_string(),
        available: MilpSolverKind::available().join(", "),
    }
}

impl FromStr for MilpSolverKind {
    type Err = SolveError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.to_ascii_lowercase();
        match normalized.as_str() {
            "microlp" => Ok(MilpSolverKind::Microlp),
            "clarabel" => {
                #[cfg(feature = "solver-clarabel")]
                {
                    Ok(MilpSolverKind::Clarabel)
                }
                #[cfg(not(feature = "solver-clarabel"))]
                {
                    Err(unknown_solver_error(&normalized))
                }
            }
            "highs" => {
                #[cfg(feature = "solver-highs")]
                {
                    Ok(MilpSolverKind::Highs)
                }
                #[cfg(not(feature = "solver-highs"))]
                {
                    Err(unknown_solver_error(&normalized))
                }
            }
            other => Err(unknown_solver_error(other)),
        }
    }
}

fn default_integrality_tolerance() -> f64 {
    1e-5
}

/// Solver settings, the `[solver]` table of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SolverConfig {
    pub kind: MilpSolverKind,
    /// Allowed distance of a boolean from 0 or 1
    #[serde(default = "default_integrality_tolerance")]
    pub integrality_tolerance: f64,
    /// Solve the LP relaxation
    pub relax_integrality: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            kind: MilpSolverKind::default(),
            integrality_tolerance: default_integrality_tolerance(),
            relax_integrality: false,
        }
    }
}

impl SolverConfig {
    /// Booleans are relaxed on request or when the backend cannot branch.
    pub fn relaxes_integrality(&self) -> bool {
        self.relax_integrality || !self.kind.supports_integers()
    }

    /// Assemble a model with the integrality setting of this config.
    pub fn builder<'a>(&self, system: &'a EnergySystem) -> ModelBuilder<'a> {
        ModelBuilder::new(system).relax_integrality(self.relaxes_integrality())
    }
}

/// Failures of the solve call itself. Infeasible and unbounded models are
/// not errors; they come back as a [`SolveStatus`].
#[derive(Error, Debug)]
pub enum SolveError {
    #[error("unknown solver '{label}'; supported values: {available}")]
    UnknownSolver { label: String, available: String },

    #[error("solver {0} cannot handle integer variables; assemble the model with relaxed integrality")]
    IntegersUnsupported(MilpSolverKind),

    #[error("solver {solver} failed: {message}")]
    Backend {
        solver: MilpSolverKind,
        message: String,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Values of all arena variables in declaration order, or the status that
/// prevented a solution.
type BackendResult = Result<Vec<f64>, ResolutionError>;

fn run_backend<M>(mut problem: M, constraints: Vec<(ConstraintFamily, Constraint)>, handles: &[Variable]) -> BackendResult
where
    M: SolverModel<Error = ResolutionError>,
{
    for (_, constraint) in constraints {
        problem.add_constraint(constraint);
    }
    let solution = problem.solve()?;
    Ok(handles.iter().map(|v| solution.value(*v)).collect())
}

/// Solve an assembled model.
pub fn solve_model(model: AssembledModel, config: &SolverConfig) -> Result<ModelSolution, SolveError> {
    let solver = config.kind;
    if !solver.supports_integers() && !model.arena.relaxes_integrality() && model.boolean_count() > 0 {
        return Err(SolveError::IntegersUnsupported(solver));
    }

    let start = Instant::now();
    let AssembledModel {
        arena,
        constraints,
        startup_energy,
        gradient_penalty,
        extra_objective,
        labels,
        horizon,
        diagnostics,
        ..
    } = model;

    let objective =
        startup_energy.expression(&arena) + gradient_penalty.expression(&arena) + extra_objective;
    let handles: Vec<Variable> = arena.slots().iter().map(|s| s.handle).collect();
    let constraint_count = constraints.len();
    let (vars, table) = arena.into_parts();
    let unsolved = vars.minimise(objective);

    info!(
        "solving with {}: {} variables, {} constraints",
        solver,
        handles.len(),
        constraint_count
    );

    let result = match solver {
        MilpSolverKind::Microlp => run_backend(
            unsolved.using(good_lp::solvers::microlp::microlp),
            constraints,
            &handles,
        ),
        #[cfg(feature = "solver-clarabel")]
        MilpSolverKind::Clarabel => run_backend(
            unsolved.using(good_lp::solvers::clarabel::clarabel),
            constraints,
            &handles,
        ),
        #[cfg(feature = "solver-highs")]
        MilpSolverKind::Highs => run_backend(
            unsolved.using(good_lp::solvers::highs::highs),
            constraints,
            &handles,
        ),
    };
    let solve_time = start.elapsed();

    let (status, values) = match result {
        Ok(values) => (SolveStatus::Optimal, Some(values)),
        Err(ResolutionError::Infeasible) => (SolveStatus::Infeasible, None),
        Err(ResolutionError::Unbounded) => (SolveStatus::Unbounded, None),
        Err(other) => {
            return Err(SolveError::Backend {
                solver,
                message: other.to_string(),
            })
        }
    };

    let mut solution = ModelSolution::new(
        status,
        solver,
        solve_time,
        table,
        labels,
        horizon,
        diagnostics,
    );
    if let Some(values) = values {
        solution.startup_energy = Some(startup_energy.evaluate(&values));
        solution.gradient_penalty = Some(gradient_penalty.evaluate(&values));
        solution.set_values(values, config.integrality_tolerance);
    }

    match solution.status {
        SolveStatus::NumericallySuspect => warn!(
            "solution has {} boolean values outside the integrality tolerance",
            solution.integrality_violations().len()
        ),
        status => info!("solve finished: {} in {:.3}s", status, solve_time.as_secs_f64()),
    }
    Ok(solution)
}

impl AssembledModel {
    pub fn solve(self, config: &SolverConfig) -> Result<ModelSolution, SolveError> {
        solve_model(self, config)
    }
}
