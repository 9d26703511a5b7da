//! Conversion units (process instances) and their commodity ratios.

use serde::{Deserialize, Serialize};

/// Key of a unit: `(timeframe, site, unit name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitKey {
    pub timeframe: i32,
    pub site: String,
    pub name: String,
}

impl UnitKey {
    pub fn new(timeframe: i32, site: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            timeframe,
            site: site.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for UnitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.timeframe, self.site, self.name)
    }
}

fn unbounded() -> f64 {
    f64::INFINITY
}

/// Static parameters of one conversion unit.
///
/// Capacities are power (e.g. MW); throughput per step is energy
/// (`cap * dt`). `max-grad` is a fraction of capacity per hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Unit {
    pub timeframe: i32,
    pub site: String,
    #[serde(rename = "unit")]
    pub name: String,
    #[serde(default)]
    pub cap_lo: f64,
    #[serde(default = "unbounded")]
    pub cap_up: f64,
    #[serde(default)]
    pub inst_cap: f64,
    #[serde(default)]
    pub min_fraction: f64,
    /// Hours within the startup step during which output is tapered
    #[serde(default)]
    pub start_up_duration: f64,
    /// Extra input energy per unit of capacity consumed at startup
    #[serde(default)]
    pub start_up_energy: f64,
    #[serde(default = "unbounded")]
    pub max_grad: f64,
    /// Minimum consecutive running steps, whole number
    #[serde(default)]
    pub min_con_op_time: f64,
    /// Steps the unit has already been running before `t0`, whole number
    #[serde(default)]
    pub pre_active_timesteps: f64,
    #[serde(default)]
    pub grad_penalty: Option<f64>,
}

impl Unit {
    /// A freely expandable unit without operating constraints.
    pub fn new(timeframe: i32, site: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            timeframe,
            site: site.into(),
            name: name.into(),
            cap_lo: 0.0,
            cap_up: f64::INFINITY,
            inst_cap: 0.0,
            min_fraction: 0.0,
            start_up_duration: 0.0,
            start_up_energy: 0.0,
            max_grad: f64::INFINITY,
            min_con_op_time: 0.0,
            pre_active_timesteps: 0.0,
            grad_penalty: None,
        }
    }

    pub fn with_capacity(mut self, cap_lo: f64, cap_up: f64) -> Self {
        self.cap_lo = cap_lo;
        self.cap_up = cap_up;
        self
    }

    pub fn with_installed(mut self, inst_cap: f64) -> Self {
        self.inst_cap = inst_cap;
        self
    }

    /// Installed capacity that cannot be expanded (`inst-cap == cap-up`).
    pub fn with_fixed_capacity(self, cap: f64) -> Self {
        self.with_capacity(0.0, cap).with_installed(cap)
    }

    pub fn with_min_fraction(mut self, min_fraction: f64) -> Self {
        self.min_fraction = min_fraction;
        self
    }

    pub fn with_start_up(mut self, duration: f64, energy: f64) -> Self {
        self.start_up_duration = duration;
        self.start_up_energy = energy;
        self
    }

    pub fn with_max_grad(mut self, max_grad: f64) -> Self {
        self.max_grad = max_grad;
        self
    }

    pub fn with_min_run(mut self, min_con_op_time: u32, pre_active_timesteps: u32) -> Self {
        self.min_con_op_time = min_con_op_time as f64;
        self.pre_active_timesteps = pre_active_timesteps as f64;
        self
    }

    pub fn with_grad_penalty(mut self, factor: f64) -> Self {
        self.grad_penalty = Some(factor);
        self
    }

    pub fn key(&self) -> UnitKey {
        UnitKey::new(self.timeframe, self.site.clone(), self.name.clone())
    }

    pub fn label(&self) -> String {
        self.key().to_string()
    }

    /// Capacity cannot change (`inst-cap == cap-up`).
    pub fn is_fixed_capacity(&self) -> bool {
        self.inst_cap == self.cap_up
    }

    pub fn min_uptime_steps(&self) -> usize {
        self.min_con_op_time.max(0.0) as usize
    }

    pub fn pre_active_steps(&self) -> usize {
        self.pre_active_timesteps.max(0.0) as usize
    }
}

/// Direction of a commodity flow relative to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commodity ratio of a unit type in one timeframe.
///
/// Applies to every unit with this timeframe and name regardless of site.
/// `ratio` holds at full load; `ratio-min` at minimum load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Ratio {
    pub timeframe: i32,
    pub unit: String,
    pub commodity: String,
    pub direction: Direction,
    pub ratio: f64,
    #[serde(default)]
    pub ratio_min: Option<f64>,
}

impl Ratio {
    pub fn input(timeframe: i32, unit: impl Into<String>, commodity: impl Into<String>, ratio: f64) -> Self {
        Self {
            timeframe,
            unit: unit.into(),
            commodity: commodity.into(),
            direction: Direction::In,
            ratio,
            ratio_min: None,
        }
    }

    pub fn output(timeframe: i32, unit: impl Into<String>, commodity: impl Into<String>, ratio: f64) -> Self {
        Self {
            direction: Direction::Out,
            ..Self::input(timeframe, unit, commodity, ratio)
        }
    }

    pub fn with_ratio_min(mut self, ratio_min: f64) -> Self {
        self.ratio_min = Some(ratio_min);
        self
    }

    pub fn applies_to(&self, unit: &Unit) -> bool {
        self.timeframe == unit.timeframe && self.unit == unit.name
    }

    /// Has a positive minimum-load ratio.
    pub fn has_part_load(&self) -> bool {
        self.ratio_min.is_some_and(|r| r > 0.0)
    }

    pub fn label(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.timeframe, self.unit, self.commodity, self.direction
        )
    }
}
