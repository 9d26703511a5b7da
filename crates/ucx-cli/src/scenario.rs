//! Scenario files: an energy system plus solver settings and fixed
//! trajectories.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use ucx_core::{Direction, EnergySystem, UnitKey};
use ucx_milp::{AssembledModel, Owner, SolverConfig, VarFamily, VarKey};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(flatten)]
    pub system: EnergySystem,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub fix: Vec<FixEntry>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("reading scenario file: {}", path.display()))?;
        toml::from_str(&source)
            .with_context(|| format!("parsing scenario file: {}", path.display()))
    }

    /// Resolve every `[[fix]]` entry against the system.
    pub fn fixed_values(&self) -> Result<Vec<(VarKey, f64)>> {
        let mut fixed = Vec::new();
        for entry in &self.fix {
            fixed.extend(entry.resolve(&self.system)?);
        }
        Ok(fixed)
    }

    /// Pin all fixed values in an assembled model. Returns the number of
    /// pinned variables.
    pub fn apply_fixes(&self, model: &mut AssembledModel) -> Result<usize> {
        let fixed = self.fixed_values()?;
        for (key, value) in &fixed {
            model
                .fix(*key, *value)
                .with_context(|| format!("fixing {}", model.describe(key)))?;
        }
        Ok(fixed.len())
    }
}

/// A trajectory (or a single capacity value) pinned before the solve.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FixEntry {
    pub timeframe: i32,
    pub site: String,
    pub unit: String,
    /// Variable family name, e.g. `tau`, `run`, `e_out`, `cap`
    pub variable: String,
    /// Required for flow families
    #[serde(default)]
    pub commodity: Option<String>,
    /// Label of the first fixed step; defaults to the first modeled step
    #[serde(default)]
    pub start: Option<u32>,
    pub values: Vec<f64>,
}

fn flow_direction(family: VarFamily) -> Option<Direction> {
    match family {
        VarFamily::FlowIn | VarFamily::OffsetIn | VarFamily::NoStartIn | VarFamily::StartupLoss => {
            Some(Direction::In)
        }
        VarFamily::FlowOut | VarFamily::OffsetOut | VarFamily::NoStartOut => Some(Direction::Out),
        _ => None,
    }
}

fn is_per_entity(family: VarFamily) -> bool {
    matches!(
        family,
        VarFamily::Capacity
            | VarFamily::NewCapacity
            | VarFamily::PowerCapacity
            | VarFamily::NewPowerCapacity
            | VarFamily::Build
    )
}

impl FixEntry {
    pub fn resolve(&self, system: &EnergySystem) -> Result<Vec<(VarKey, f64)>> {
        let key = UnitKey::new(self.timeframe, self.site.clone(), self.unit.clone());
        let index = system
            .unit_index(&key)
            .ok_or_else(|| anyhow!("fix references unknown unit {}", key))?;
        let family: VarFamily = self.variable.parse().map_err(anyhow::Error::msg)?;
        let owner = Owner::Unit(index);

        if is_per_entity(family) {
            if self.values.len() != 1 || self.start.is_some() {
                bail!("fix of {} on {} takes exactly one value and no start", family, key);
            }
            return Ok(vec![(VarKey::entity(family, owner), self.values[0])]);
        }

        let ratio = match flow_direction(family) {
            Some(direction) => {
                let commodity = self
                    .commodity
                    .as_deref()
                    .ok_or_else(|| anyhow!("fix of {} on {} needs a commodity", family, key))?;
                let unit = &system.units[index];
                let (ratio, _) = system
                    .ratios_of(unit)
                    .find(|(_, r)| r.commodity == commodity && r.direction == direction)
                    .ok_or_else(|| {
                        anyhow!("{} has no {} ratio for {}", key, direction, commodity)
                    })?;
                Some(ratio)
            }
            None => None,
        };

        let horizon = &system.horizon;
        let first = self.start.unwrap_or(horizon.label(1));
        self.values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let label = first + i as u32;
                let step = horizon.position(label).ok_or_else(|| {
                    anyhow!("fix of {} on {} reaches step {} outside the horizon", family, key, label)
                })?;
                let key = VarKey {
                    family,
                    owner,
                    step: Some(step),
                    ratio,
                };
                Ok((key, *value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
[horizon]
start = 10
steps = 3

[[unit]]
timeframe = 2020
site = "Mid"
unit = "Gas"
cap-up = 20.0
min-fraction = 0.4

[[ratio]]
timeframe = 2020
unit = "Gas"
commodity = "Elec"
direction = "out"
ratio = 1.0
ratio-min = 1.3

[[fix]]
timeframe = 2020
site = "Mid"
unit = "Gas"
variable = "e-out"
commodity = "Elec"
start = 12
values = [4.0, 6.0]

[[fix]]
timeframe = 2020
site = "Mid"
unit = "Gas"
variable = "cap"
values = [20.0]
"#;

    #[test]
    fn test_scenario_with_fixes() {
        let scenario: Scenario = toml::from_str(SCENARIO).unwrap();
        assert_eq!(scenario.system.horizon.start, 10);
        assert_eq!(scenario.solver, SolverConfig::default());

        let fixed = scenario.fixed_values().unwrap();
        assert_eq!(fixed.len(), 3);
        assert_eq!(fixed[0].0, VarKey::flow(VarFamily::FlowOut, Owner::Unit(0), 2, 0));
        assert_eq!(fixed[1].0, VarKey::flow(VarFamily::FlowOut, Owner::Unit(0), 3, 0));
        assert_eq!(fixed[2], (VarKey::entity(VarFamily::Capacity, Owner::Unit(0)), 20.0));
    }

    #[test]
    fn test_fix_past_horizon() {
        let mut scenario: Scenario = toml::from_str(SCENARIO).unwrap();
        scenario.fix[0].values.push(7.0);
        let err = scenario.fixed_values().unwrap_err();
        assert!(err.to_string().contains("outside the horizon"), "{}", err);
    }

    #[test]
    fn test_fix_flow_without_commodity() {
        let mut scenario: Scenario = toml::from_str(SCENARIO).unwrap();
        scenario.fix[0].commodity = None;
        let err = scenario.fixed_values().unwrap_err();
        assert!(err.to_string().contains("needs a commodity"), "{}", err);
    }

    #[test]
    fn test_fix_unknown_family() {
        let mut scenario: Scenario = toml::from_str(SCENARIO).unwrap();
        scenario.fix[1].variable = "voltage".to_string();
        let err = scenario.fixed_values().unwrap_err();
        assert!(err.to_string().contains("unknown variable family"), "{}", err);
    }
}
