//! Solve results.

use std::time::Duration;

use serde::Serialize;
use tracing::warn;
use ucx_core::{Diagnostics, Horizon};

use crate::arena::{Owner, VarFamily, VarKey, VarTable};
use crate::model::EntityLabels;
use crate::solver::MilpSolverKind;

/// Outcome the caller branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// Optimal, but some booleans came back outside {0, 1} beyond the
    /// integrality tolerance
    NumericallySuspect,
}

impl SolveStatus {
    /// A solution with values is available.
    pub fn has_values(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::NumericallySuspect)
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Unbounded => write!(f, "unbounded"),
            SolveStatus::NumericallySuspect => write!(f, "numerically_suspect"),
        }
    }
}

/// A boolean whose value is not within tolerance of 0 or 1.
#[derive(Debug, Clone, Serialize)]
pub struct IntegralityViolation {
    pub key: VarKey,
    pub name: String,
    pub value: f64,
}

/// Distance of `value` from the nearest of 0 and 1.
pub fn integrality_gap(value: f64) -> f64 {
    value.abs().min((value - 1.0).abs())
}

#[derive(Debug, Clone)]
pub struct ModelSolution {
    pub status: SolveStatus,
    pub solver: MilpSolverKind,
    pub solve_time: Duration,
    /// `Σ dt·startup_loss`
    pub startup_energy: Option<f64>,
    /// `Σ grad-penalty·(up + down)`
    pub gradient_penalty: Option<f64>,
    /// Validation warnings plus integrality findings
    pub diagnostics: Diagnostics,
    values: Option<Vec<f64>>,
    table: VarTable,
    labels: EntityLabels,
    horizon: Horizon,
    violations: Vec<IntegralityViolation>,
}

impl ModelSolution {
    pub(crate) fn new(
        status: SolveStatus,
        solver: MilpSolverKind,
        solve_time: Duration,
        table: VarTable,
        labels: EntityLabels,
        horizon: Horizon,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            status,
            solver,
            solve_time,
            startup_energy: None,
            gradient_penalty: None,
            diagnostics,
            values: None,
            table,
            labels,
            horizon,
            violations: Vec::new(),
        }
    }

    /// Store values and check every boolean against `tolerance`.
    pub(crate) fn set_values(&mut self, values: Vec<f64>, tolerance: f64) {
        for (index, slot) in self.table.slots().iter().enumerate() {
            if !slot.key.family.is_boolean() {
                continue;
            }
            let value = values[index];
            if integrality_gap(value) > tolerance {
                let name = self.labels.describe(&slot.key, &self.horizon);
                warn!("{} = {} is not boolean", name, value);
                let entity = self.labels.owner(slot.key.owner).to_string();
                let message = format!("{} = {}", slot.key.family, value);
                match slot.key.step {
                    Some(step) => self.diagnostics.add_warning_at_step(
                        "integrality",
                        &message,
                        &entity,
                        self.horizon.label(step),
                    ),
                    None => self
                        .diagnostics
                        .add_warning_with_entity("integrality", &message, &entity),
                }
                self.violations.push(IntegralityViolation {
                    key: slot.key,
                    name,
                    value,
                });
            }
        }
        if !self.violations.is_empty() {
            self.status = SolveStatus::NumericallySuspect;
        }
        self.values = Some(values);
    }

    pub fn has_values(&self) -> bool {
        self.values.is_some()
    }

    pub fn value(&self, key: &VarKey) -> Option<f64> {
        let values = self.values.as_ref()?;
        self.table.id(key).map(|id| values[id.0])
    }

    /// Value of a per-step variable at every horizon position that has one,
    /// as `(timestep label, value)`.
    pub fn series(&self, family: VarFamily, owner: Owner, ratio: Option<usize>) -> Vec<(u32, f64)> {
        self.horizon
            .positions()
            .filter_map(|p| {
                let key = VarKey {
                    family,
                    owner,
                    step: Some(p),
                    ratio,
                };
                self.value(&key).map(|v| (self.horizon.label(p), v))
            })
            .collect()
    }

    /// Rounded run state of a unit at a horizon position.
    pub fn is_running(&self, unit: usize, position: usize) -> Option<bool> {
        self.value(&VarKey::at(VarFamily::Run, Owner::Unit(unit), position))
            .map(|v| v > 0.5)
    }

    /// Rounded build decision of an entity.
    pub fn is_built(&self, owner: Owner) -> Option<bool> {
        self.value(&VarKey::entity(VarFamily::Build, owner))
            .map(|v| v > 0.5)
    }

    pub fn integrality_violations(&self) -> &[IntegralityViolation] {
        &self.violations
    }

    pub fn startup_count(&self, unit: usize) -> usize {
        self.series(VarFamily::Startup, Owner::Unit(unit), None)
            .iter()
            .filter(|(_, v)| *v > 0.5)
            .count()
    }

    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Solution Summary\n{}\n", "=".repeat(40)));
        s.push_str(&format!("Status: {}\n", self.status));
        s.push_str(&format!("Solver: {}\n", self.solver));
        s.push_str(&format!("Solve Time: {:.2?}\n", self.solve_time));
        if let Some(energy) = self.startup_energy {
            s.push_str(&format!("Startup Energy: {:.4}\n", energy));
        }
        if let Some(penalty) = self.gradient_penalty {
            s.push_str(&format!("Gradient Penalty: {:.4}\n", penalty));
        }
        if !self.has_values() {
            return s;
        }

        s.push_str("\nCapacities:\n");
        for (i, label) in self.labels.units.iter().enumerate() {
            let owner = Owner::Unit(i);
            if let Some(cap) = self.value(&VarKey::entity(VarFamily::Capacity, owner)) {
                let build = match self.is_built(owner) {
                    Some(true) => " [BUILD]",
                    Some(false) => " [SKIP]",
                    None => "",
                };
                s.push_str(&format!("  {}: {:.3}{}\n", label, cap, build));
            }
        }
        for (i, label) in self.labels.storages.iter().enumerate() {
            let owner = Owner::Storage(i);
            let energy = self.value(&VarKey::entity(VarFamily::Capacity, owner));
            let power = self.value(&VarKey::entity(VarFamily::PowerCapacity, owner));
            if let (Some(energy), Some(power)) = (energy, power) {
                s.push_str(&format!("  {}: {:.3} MWh / {:.3} MW\n", label, energy, power));
            }
        }
        for (i, label) in self.labels.transmissions.iter().enumerate() {
            if let Some(cap) = self.value(&VarKey::entity(VarFamily::Capacity, Owner::Transmission(i))) {
                s.push_str(&format!("  {}: {:.3}\n", label, cap));
            }
        }

        let schedules: Vec<_> = (0..self.labels.units.len())
            .filter_map(|i| {
                let states: String = self
                    .horizon
                    .modeled()
                    .filter_map(|p| self.is_running(i, p))
                    .map(|on| if on { '#' } else { '.' })
                    .collect();
                (!states.is_empty()).then(|| (i, states))
            })
            .collect();
        if !schedules.is_empty() {
            s.push_str("\nOperating States:\n");
            for (i, states) in schedules {
                s.push_str(&format!(
                    "  {}: {} ({} startups)\n",
                    self.labels.units[i],
                    states,
                    self.startup_count(i)
                ));
            }
        }

        if !self.violations.is_empty() {
            s.push_str(&format!("\nIntegrality Violations: {}\n", self.violations.len()));
            for violation in &self.violations {
                s.push_str(&format!("  {} = {:.6}\n", violation.name, violation.value));
            }
        }
        s
    }
}
