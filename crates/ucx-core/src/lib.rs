//! # ucx-core: data model for unit-commitment capacity expansion
//!
//! Static entity records consumed by the `ucx-milp` formulation:
//!
//! - [`Unit`]: a conversion unit at one site with capacity bounds and
//!   operating parameters (min-fraction, start-up, ramp limit, min run time)
//! - [`Ratio`]: commodity in/out ratio at full and minimum load
//! - [`Storage`] and [`Transmission`]: only their capacity bounds are used
//! - [`Horizon`]: the initial step `t0` plus the modeled steps and `dt`
//!
//! An [`EnergySystem`] bundles them with the formulation [`Features`] and can
//! be read from a TOML scenario. [`validation::validate`] rejects
//! configurations no model can be built from.
//!
//! ```
//! use ucx_core::{EnergySystem, Horizon, Ratio, Unit};
//!
//! let mut system = EnergySystem::new(Horizon::new(24, 1.0));
//! system.add_unit(
//!     Unit::new(2020, "Mid", "Coal")
//!         .with_capacity(0.0, 100.0)
//!         .with_min_fraction(0.4),
//! );
//! system.add_ratio(Ratio::input(2020, "Coal", "Coal", 2.2).with_ratio_min(2.6));
//! system.add_ratio(Ratio::output(2020, "Coal", "Elec", 1.0));
//!
//! let warnings = ucx_core::validation::validate(&system).unwrap();
//! assert_eq!(warnings.warning_count(), 1); // no start-up-energy
//! ```

pub mod diagnostics;
pub mod error;
pub mod horizon;
pub mod process;
pub mod storage;
pub mod system;
pub mod validation;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{ModelError, ModelResult};
pub use horizon::Horizon;
pub use process::{Direction, Ratio, Unit, UnitKey};
pub use storage::{CapacityBounds, Storage, Transmission};
pub use system::{EnergySystem, Features};
