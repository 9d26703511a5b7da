//! Per-unit formulation plan.
//!
//! Which constraint families a unit receives is decided here, once, from its
//! parameters and the system's feature switches. Assembly then emits exactly
//! the planned families; nothing is emitted and later replaced.

use ucx_core::{CapacityBounds, Direction, EnergySystem, ModelResult};

use crate::coefficients::{self, PartLoadCoefficients};

/// How a capacity variable is sized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityPlan {
    pub bounds: CapacityBounds,
    /// Gated by a `build` flag: `cap ∈ {0} ∪ [cap-lo, cap-up]`
    pub discrete: bool,
}

impl CapacityPlan {
    pub fn is_fixed(&self) -> bool {
        self.bounds.is_fixed()
    }
}

/// How part-load ratios are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartLoadMode {
    /// All flows are `R·tau`
    None,
    /// Operating-state formulation switched off: the unit is treated as
    /// always online and the offset is proportional to capacity
    AlwaysOn,
    /// Offset switched by the run state
    Switched,
}

/// Operating-state variables and the initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingPlan {
    /// `run[t0]`
    pub initially_on: bool,
    /// Modeled steps `1..=pinned_steps` must run to finish a pre-horizon run
    pub pinned_steps: usize,
    /// Minimum consecutive running steps, 0 for none
    pub min_uptime: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartLoadRatio {
    pub ratio: usize,
    pub direction: Direction,
    pub full_ratio: f64,
    pub coefficients: PartLoadCoefficients,
    /// Startup loss per unit of capacity (`start-up-energy·R`), inputs only
    pub startup_loss: Option<f64>,
    /// `max(R, min-fraction·r)`
    pub peak_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRatio {
    pub ratio: usize,
    pub direction: Direction,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientRule {
    Unlimited,
    /// `|tau[t] − tau[t−1]| ≤ cap·g·dt`
    Plain { max_grad: f64 },
    /// Relaxed at startup and turnoff, with a startup floor at
    /// `min-fraction·cap·dt`. Used when the minimum load itself is a larger
    /// step than the ramp limit allows.
    StartupExceptions { max_grad: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitPlan {
    pub unit: usize,
    pub label: String,
    pub capacity: CapacityPlan,
    pub operating: Option<OperatingPlan>,
    pub part_load: PartLoadMode,
    pub part_load_ratios: Vec<PartLoadRatio>,
    pub linear_ratios: Vec<LinearRatio>,
    /// `(dt − start-up-duration)/dt` when output is tapered at startup
    pub taper_factor: Option<f64>,
    pub gradient: GradientRule,
    pub grad_penalty: Option<f64>,
}

impl UnitPlan {
    pub fn has_startup_loss(&self) -> bool {
        self.part_load_ratios.iter().any(|r| r.startup_loss.is_some())
    }
}

/// Plan the formulation of `system.units[index]`.
pub fn plan_unit(system: &EnergySystem, index: usize) -> ModelResult<UnitPlan> {
    let unit = &system.units[index];
    let label = unit.label();
    let features = system.features;
    let dt = system.horizon.dt;

    let operating = system.needs_operating_state(unit).then(|| {
        let pre_active = unit.pre_active_steps();
        let min_uptime = unit.min_uptime_steps();
        let pinned_steps = if pre_active > 0 {
            min_uptime
                .saturating_sub(pre_active)
                .min(system.horizon.steps)
        } else {
            0
        };
        OperatingPlan {
            initially_on: pre_active > 0,
            pinned_steps,
            min_uptime,
        }
    });

    let part_load = match (system.has_part_load(unit), operating.is_some()) {
        (false, _) => PartLoadMode::None,
        (true, true) => PartLoadMode::Switched,
        (true, false) => PartLoadMode::AlwaysOn,
    };

    let mut part_load_ratios = Vec::new();
    let mut linear_ratios = Vec::new();
    for (ratio_index, ratio) in system.ratios_of(unit) {
        match ratio.ratio_min {
            Some(r_min) if part_load != PartLoadMode::None && r_min > 0.0 => {
                let coefficients =
                    coefficients::derive(&label, ratio.ratio, r_min, unit.min_fraction)?;
                let startup_loss = (part_load == PartLoadMode::Switched
                    && ratio.direction == Direction::In
                    && unit.start_up_energy > 0.0)
                    .then(|| unit.start_up_energy * ratio.ratio);
                part_load_ratios.push(PartLoadRatio {
                    ratio: ratio_index,
                    direction: ratio.direction,
                    full_ratio: ratio.ratio,
                    coefficients,
                    startup_loss,
                    peak_ratio: ratio.ratio.max(unit.min_fraction * r_min),
                });
            }
            _ => linear_ratios.push(LinearRatio {
                ratio: ratio_index,
                direction: ratio.direction,
                value: ratio.ratio,
            }),
        }
    }

    let taper_factor = (part_load == PartLoadMode::Switched && unit.start_up_duration > 0.0)
        .then(|| (dt - unit.start_up_duration) / dt);

    let gradient = if unit.max_grad.is_finite() && unit.max_grad * dt < 1.0 {
        if part_load == PartLoadMode::Switched && unit.min_fraction >= unit.max_grad {
            GradientRule::StartupExceptions {
                max_grad: unit.max_grad,
            }
        } else {
            GradientRule::Plain {
                max_grad: unit.max_grad,
            }
        }
    } else {
        GradientRule::Unlimited
    };

    let grad_penalty = if features.gradient_penalty {
        unit.grad_penalty
    } else {
        None
    };

    Ok(UnitPlan {
        unit: index,
        label,
        capacity: CapacityPlan {
            bounds: CapacityBounds::new(unit.cap_lo, unit.cap_up, unit.inst_cap),
            discrete: features.min_cap,
        },
        operating,
        part_load,
        part_load_ratios,
        linear_ratios,
        taper_factor,
        gradient,
        grad_penalty,
    })
}
