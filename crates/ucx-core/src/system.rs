//! The energy system: horizon, feature switches and all entity records.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ModelResult;
use crate::horizon::Horizon;
use crate::process::{Ratio, Unit, UnitKey};
use crate::storage::{Storage, Transmission};

/// Formulation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Features {
    /// Discrete capacity sizing with a `build` flag per entity
    pub min_cap: bool,
    /// Operating-state formulation (run/startup/turnoff, part-load, min-run)
    pub part_load: bool,
    /// Slack pair per step for units with a `grad-penalty` factor
    pub gradient_penalty: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            min_cap: false,
            part_load: true,
            gradient_penalty: false,
        }
    }
}

/// Everything the formulation consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergySystem {
    pub horizon: Horizon,
    #[serde(default)]
    pub features: Features,
    #[serde(default, rename = "unit")]
    pub units: Vec<Unit>,
    #[serde(default, rename = "ratio")]
    pub ratios: Vec<Ratio>,
    #[serde(default, rename = "storage")]
    pub storages: Vec<Storage>,
    #[serde(default, rename = "transmission")]
    pub transmissions: Vec<Transmission>,
}

impl EnergySystem {
    pub fn new(horizon: Horizon) -> Self {
        Self {
            horizon,
            features: Features::default(),
            units: Vec::new(),
            ratios: Vec::new(),
            storages: Vec::new(),
            transmissions: Vec::new(),
        }
    }

    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    pub fn add_unit(&mut self, unit: Unit) -> usize {
        self.units.push(unit);
        self.units.len() - 1
    }

    pub fn add_ratio(&mut self, ratio: Ratio) -> usize {
        self.ratios.push(ratio);
        self.ratios.len() - 1
    }

    pub fn add_storage(&mut self, storage: Storage) -> usize {
        self.storages.push(storage);
        self.storages.len() - 1
    }

    pub fn add_transmission(&mut self, transmission: Transmission) -> usize {
        self.transmissions.push(transmission);
        self.transmissions.len() - 1
    }

    pub fn from_toml_str(source: &str) -> ModelResult<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ModelResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn unit_index(&self, key: &UnitKey) -> Option<usize> {
        self.units.iter().position(|u| {
            u.timeframe == key.timeframe && u.site == key.site && u.name == key.name
        })
    }

    /// Ratios of a unit with their indices into `self.ratios`.
    pub fn ratios_of<'a>(&'a self, unit: &'a Unit) -> impl Iterator<Item = (usize, &'a Ratio)> + 'a {
        self.ratios
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.applies_to(unit))
    }

    /// A unit with positive min-fraction and at least one positive ratio-min.
    pub fn has_part_load(&self, unit: &Unit) -> bool {
        unit.min_fraction > 0.0 && self.ratios_of(unit).any(|(_, r)| r.has_part_load())
    }

    /// Whether the unit gets run/startup/turnoff variables.
    pub fn needs_operating_state(&self, unit: &Unit) -> bool {
        self.features.part_load && (self.has_part_load(unit) || unit.min_con_op_time > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
        [horizon]
        steps = 3
        dt = 0.5

        [features]
        min-cap = true

        [[unit]]
        timeframe = 2020
        site = "Mid"
        unit = "Coal"
        cap-up = 100
        min-fraction = 0.4

        [[ratio]]
        timeframe = 2020
        unit = "Coal"
        commodity = "Coal"
        direction = "in"
        ratio = 2.2
        ratio-min = 2.6

        [[ratio]]
        timeframe = 2020
        unit = "Coal"
        commodity = "Elec"
        direction = "out"
        ratio = 1.0
    "#;

    #[test]
    fn test_from_toml_str() {
        let system = EnergySystem::from_toml_str(SCENARIO).unwrap();
        assert_eq!(system.horizon.steps, 3);
        assert!(system.features.min_cap);
        assert!(system.features.part_load);
        assert!(!system.features.gradient_penalty);
        assert_eq!(system.units.len(), 1);
        assert_eq!(system.ratios.len(), 2);
        assert!(system.storages.is_empty());
    }

    #[test]
    fn test_part_load_and_operating_state() {
        let mut system = EnergySystem::from_toml_str(SCENARIO).unwrap();
        let coal = system.units[0].clone();
        assert_eq!(system.ratios_of(&coal).count(), 2);
        assert!(system.has_part_load(&coal));
        assert!(system.needs_operating_state(&coal));

        system.features.part_load = false;
        assert!(!system.needs_operating_state(&coal));

        let plain = Unit::new(2020, "Mid", "Wind");
        assert!(!system.has_part_load(&plain));
    }

    #[test]
    fn test_min_run_needs_operating_state() {
        let mut system = EnergySystem::new(Horizon::new(4, 1.0));
        let idx = system.add_unit(
            Unit::new(2020, "Mid", "Gas")
                .with_fixed_capacity(10.0)
                .with_min_run(3, 0),
        );
        let unit = system.units[idx].clone();
        assert!(!system.has_part_load(&unit));
        assert!(system.needs_operating_state(&unit));
        assert_eq!(system.unit_index(&unit.key()), Some(0));
    }

    #[test]
    fn test_parse_error() {
        assert!(EnergySystem::from_toml_str("[horizon]\nsteps = \"x\"").is_err());
    }
}
