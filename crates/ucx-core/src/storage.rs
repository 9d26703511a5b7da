//! Storage and transmission records. Only their capacity parameters are
//! consumed here; balance equations belong to the surrounding model.

use serde::{Deserialize, Serialize};

fn unbounded() -> f64 {
    f64::INFINITY
}

/// Lower/upper/installed triple of one sizable capacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityBounds {
    pub lo: f64,
    pub up: f64,
    pub installed: f64,
}

impl CapacityBounds {
    pub fn new(lo: f64, up: f64, installed: f64) -> Self {
        Self { lo, up, installed }
    }

    pub fn is_fixed(&self) -> bool {
        self.installed == self.up
    }
}

/// A storage with separately sized energy (`c`) and power (`p`) capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Storage {
    pub timeframe: i32,
    pub site: String,
    #[serde(rename = "storage")]
    pub name: String,
    pub commodity: String,
    #[serde(default)]
    pub cap_lo_c: f64,
    #[serde(default = "unbounded")]
    pub cap_up_c: f64,
    #[serde(default)]
    pub inst_cap_c: f64,
    #[serde(default)]
    pub cap_lo_p: f64,
    #[serde(default = "unbounded")]
    pub cap_up_p: f64,
    #[serde(default)]
    pub inst_cap_p: f64,
}

impl Storage {
    pub fn new(
        timeframe: i32,
        site: impl Into<String>,
        name: impl Into<String>,
        commodity: impl Into<String>,
    ) -> Self {
        Self {
            timeframe,
            site: site.into(),
            name: name.into(),
            commodity: commodity.into(),
            cap_lo_c: 0.0,
            cap_up_c: f64::INFINITY,
            inst_cap_c: 0.0,
            cap_lo_p: 0.0,
            cap_up_p: f64::INFINITY,
            inst_cap_p: 0.0,
        }
    }

    pub fn with_energy_capacity(mut self, lo: f64, up: f64, installed: f64) -> Self {
        self.cap_lo_c = lo;
        self.cap_up_c = up;
        self.inst_cap_c = installed;
        self
    }

    pub fn with_power_capacity(mut self, lo: f64, up: f64, installed: f64) -> Self {
        self.cap_lo_p = lo;
        self.cap_up_p = up;
        self.inst_cap_p = installed;
        self
    }

    pub fn energy(&self) -> CapacityBounds {
        CapacityBounds::new(self.cap_lo_c, self.cap_up_c, self.inst_cap_c)
    }

    pub fn power(&self) -> CapacityBounds {
        CapacityBounds::new(self.cap_lo_p, self.cap_up_p, self.inst_cap_p)
    }

    pub fn label(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.timeframe, self.site, self.name, self.commodity
        )
    }
}

/// A directed transmission line between two sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Transmission {
    pub timeframe: i32,
    pub site_in: String,
    pub site_out: String,
    #[serde(rename = "transmission")]
    pub name: String,
    pub commodity: String,
    #[serde(default)]
    pub cap_lo: f64,
    #[serde(default = "unbounded")]
    pub cap_up: f64,
    #[serde(default)]
    pub inst_cap: f64,
}

impl Transmission {
    pub fn new(
        timeframe: i32,
        site_in: impl Into<String>,
        site_out: impl Into<String>,
        name: impl Into<String>,
        commodity: impl Into<String>,
    ) -> Self {
        Self {
            timeframe,
            site_in: site_in.into(),
            site_out: site_out.into(),
            name: name.into(),
            commodity: commodity.into(),
            cap_lo: 0.0,
            cap_up: f64::INFINITY,
            inst_cap: 0.0,
        }
    }

    pub fn with_capacity(mut self, lo: f64, up: f64, installed: f64) -> Self {
        self.cap_lo = lo;
        self.cap_up = up;
        self.inst_cap = installed;
        self
    }

    pub fn capacity(&self) -> CapacityBounds {
        CapacityBounds::new(self.cap_lo, self.cap_up, self.inst_cap)
    }

    pub fn label(&self) -> String {
        format!(
            "{}.{}->{}.{}.{}",
            self.timeframe, self.site_in, self.site_out, self.name, self.commodity
        )
    }
}
