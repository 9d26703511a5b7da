//! # ucx-milp: operating-state and capacity sizing MILP
//!
//! Turns a validated [`ucx_core::EnergySystem`] into decision variables and
//! constraints for a `good_lp` backend:
//!
//! - **Operating state**: `run`, `startup`, `turnoff` booleans per unit and
//!   step with transition detection and run-coupled throughput
//! - **Part load**: flows interpolated between `ratio-min` and `ratio`, with
//!   the capacity offset switched by `run`
//! - **Startup transients**: extra input energy and tapered flow in the
//!   startup step
//! - **Ramp limits**: per-step throughput change, relaxed at startup and
//!   turnoff when the minimum load exceeds the ramp limit
//! - **Minimum run time**: sliding boolean window
//! - **Discrete sizing**: a `build` flag gating capacity into
//!   `{0} ∪ [cap-lo, cap-up]`
//!
//! ```no_run
//! use ucx_core::EnergySystem;
//! use ucx_milp::{ModelBuilder, SolverConfig};
//!
//! let system = EnergySystem::from_path("scenario.toml")?;
//! let model = ModelBuilder::new(&system).build()?;
//! let solution = model.solve(&SolverConfig::default())?;
//! println!("{}", solution.summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod arena;
pub mod big_m;
pub mod coefficients;
pub mod model;
pub mod plan;
pub mod rules;
pub mod solution;
pub mod solver;

pub use arena::{Owner, VarFamily, VarKey};
pub use big_m::BigMEntry;
pub use model::{AssembledModel, ConstraintFamily, ModelBuilder};
pub use plan::{GradientRule, PartLoadMode, UnitPlan};
pub use solution::{ModelSolution, SolveStatus};
pub use solver::{solve_model, MilpSolverKind, SolveError, SolverConfig};
