//! Configuration checks run before any model is assembled.
//!
//! [`validate`] stops at the first configuration error and returns the
//! non-fatal warnings otherwise. [`inspect`] keeps going and reports every
//! finding as a diagnostic, which is what `ucx check` prints.

use std::collections::HashSet;

use tracing::warn;

use crate::diagnostics::Diagnostics;
use crate::error::{ModelError, ModelResult};
use crate::process::Unit;
use crate::storage::CapacityBounds;
use crate::system::EnergySystem;

/// Upper capacity bounds above this interact badly with the solver's
/// integrality tolerance when multiplied by a boolean.
pub const LARGE_BOUND_WARNING: f64 = 1e6;

#[derive(Default)]
struct Findings {
    errors: Vec<ModelError>,
    warnings: Diagnostics,
}

/// Check the system, failing on the first configuration error.
pub fn validate(system: &EnergySystem) -> ModelResult<Diagnostics> {
    let findings = collect(system);
    if let Some(err) = findings.errors.into_iter().next() {
        return Err(err);
    }
    for issue in findings.warnings.warnings() {
        warn!("{}", issue);
    }
    Ok(findings.warnings)
}

/// Every finding as a diagnostic, errors included.
pub fn inspect(system: &EnergySystem) -> Diagnostics {
    let findings = collect(system);
    let mut diagnostics = Diagnostics::new();
    for err in &findings.errors {
        match err.entity() {
            Some(entity) => diagnostics.add_error_with_entity("config", &err.to_string(), entity),
            None => diagnostics.add_error("config", &err.to_string()),
        }
    }
    diagnostics.merge(findings.warnings);
    diagnostics
}

fn collect(system: &EnergySystem) -> Findings {
    let mut findings = Findings::default();
    if let Err(err) = system.horizon.validate() {
        findings.errors.push(err);
    }
    check_duplicates(system, &mut findings);
    for unit in &system.units {
        check_unit(system, unit, &mut findings);
    }
    check_ratios(system, &mut findings);
    check_storages(system, &mut findings);
    check_transmissions(system, &mut findings);
    findings
}

fn check_duplicates(system: &EnergySystem, findings: &mut Findings) {
    let mut seen = HashSet::new();
    for unit in &system.units {
        let label = unit.label();
        if !seen.insert(label.clone()) {
            findings.errors.push(ModelError::Duplicate {
                kind: "unit",
                key: label,
            });
        }
    }

    let mut seen = HashSet::new();
    for ratio in &system.ratios {
        let label = ratio.label();
        if !seen.insert(label.clone()) {
            findings.errors.push(ModelError::Duplicate {
                kind: "ratio",
                key: label,
            });
        }
    }

    let mut seen = HashSet::new();
    for storage in &system.storages {
        let label = storage.label();
        if !seen.insert(label.clone()) {
            findings.errors.push(ModelError::Duplicate {
                kind: "storage",
                key: label,
            });
        }
    }

    let mut seen = HashSet::new();
    for line in &system.transmissions {
        let label = line.label();
        if !seen.insert(label.clone()) {
            findings.errors.push(ModelError::Duplicate {
                kind: "transmission",
                key: label,
            });
        }
    }
}

fn non_negative(entity: &str, parameter: &'static str, value: f64, findings: &mut Findings) {
    // NaN fails this comparison too
    if !(value >= 0.0) {
        findings.errors.push(ModelError::Negative {
            entity: entity.to_string(),
            parameter,
            value,
        });
    }
}

fn whole_steps(unit: &Unit, parameter: &'static str, value: f64, findings: &mut Findings) {
    if !(value >= 0.0) || value.fract() != 0.0 || !value.is_finite() {
        findings.errors.push(ModelError::NonInteger {
            unit: unit.label(),
            parameter,
            value,
        });
    }
}

/// Bound checks shared by all four capacity kinds.
fn check_bounds(
    entity: &str,
    names: [&'static str; 3],
    bounds: CapacityBounds,
    needs_finite_up: bool,
    findings: &mut Findings,
) {
    let [lo_name, up_name, inst_name] = names;
    non_negative(entity, lo_name, bounds.lo, findings);
    non_negative(entity, up_name, bounds.up, findings);
    non_negative(entity, inst_name, bounds.installed, findings);

    if bounds.lo > bounds.up {
        findings.errors.push(ModelError::CapacityBounds {
            entity: entity.to_string(),
            lo_name,
            lo: bounds.lo,
            up_name,
            up: bounds.up,
        });
    }
    if bounds.installed > bounds.up {
        findings.errors.push(ModelError::CapacityBounds {
            entity: entity.to_string(),
            lo_name: inst_name,
            lo: bounds.installed,
            up_name,
            up: bounds.up,
        });
    }

    if needs_finite_up {
        if bounds.up.is_infinite() {
            findings.errors.push(ModelError::UnboundedBigM {
                entity: entity.to_string(),
                parameter: up_name,
                reason: "discrete capacity sizing is enabled",
            });
        } else if bounds.up > LARGE_BOUND_WARNING {
            findings.warnings.add_warning_with_entity(
                "validation",
                &format!(
                    "{} = {} exceeds {:e}; boolean variables may drift within the integrality tolerance",
                    up_name, bounds.up, LARGE_BOUND_WARNING
                ),
                entity,
            );
        }
    }
}

fn check_unit(system: &EnergySystem, unit: &Unit, findings: &mut Findings) {
    let label = unit.label();
    let dt = system.horizon.dt;
    let min_cap = system.features.min_cap;

    check_bounds(
        &label,
        ["cap-lo", "cap-up", "inst-cap"],
        CapacityBounds::new(unit.cap_lo, unit.cap_up, unit.inst_cap),
        min_cap,
        findings,
    );
    non_negative(&label, "start-up-energy", unit.start_up_energy, findings);
    non_negative(&label, "max-grad", unit.max_grad, findings);
    if let Some(factor) = unit.grad_penalty {
        non_negative(&label, "grad-penalty", factor, findings);
    }

    if !(0.0..=1.0).contains(&unit.min_fraction) {
        findings.errors.push(ModelError::MinFraction {
            unit: label.clone(),
            value: unit.min_fraction,
        });
    } else if unit.min_fraction >= 1.0 && system.has_part_load(unit) {
        findings.errors.push(ModelError::DegeneratePartLoad {
            unit: label.clone(),
            value: unit.min_fraction,
        });
    }

    if !(0.0..=dt).contains(&unit.start_up_duration) {
        findings.errors.push(ModelError::StartupDuration {
            unit: label.clone(),
            value: unit.start_up_duration,
            dt,
        });
    }

    whole_steps(unit, "min-con-op-time", unit.min_con_op_time, findings);
    whole_steps(unit, "pre-active-timesteps", unit.pre_active_timesteps, findings);

    if !system.needs_operating_state(unit) {
        return;
    }

    if unit.cap_up.is_infinite() {
        findings.errors.push(ModelError::UnboundedBigM {
            entity: label.clone(),
            parameter: "cap-up",
            reason: "the unit has an operating state",
        });
    } else if !min_cap && unit.cap_up > LARGE_BOUND_WARNING {
        findings.warnings.add_warning_with_entity(
            "validation",
            &format!(
                "cap-up = {} exceeds {:e}; run/startup may drift within the integrality tolerance",
                unit.cap_up, LARGE_BOUND_WARNING
            ),
            &label,
        );
    }

    if system.has_part_load(unit) && unit.start_up_energy <= 0.0 {
        findings.warnings.add_warning_with_entity(
            "validation",
            "part-load unit has no start-up-energy; startups are free",
            &label,
        );
    }

    let pinned = unit.min_uptime_steps().saturating_sub(unit.pre_active_steps());
    if unit.pre_active_timesteps > 0.0 && pinned > system.horizon.steps {
        findings.warnings.add_warning_with_entity(
            "horizon",
            &format!(
                "must keep running for {} steps but the horizon has {}",
                pinned, system.horizon.steps
            ),
            &label,
        );
    }
}

fn check_ratios(system: &EnergySystem, findings: &mut Findings) {
    for ratio in &system.ratios {
        let label = ratio.label();
        non_negative(&label, "ratio", ratio.ratio, findings);
        if let Some(ratio_min) = ratio.ratio_min {
            non_negative(&label, "ratio-min", ratio_min, findings);
        }

        if !system.units.iter().any(|u| ratio.applies_to(u)) {
            findings.errors.push(ModelError::UnknownUnit {
                timeframe: ratio.timeframe,
                unit: ratio.unit.clone(),
                commodity: ratio.commodity.clone(),
                direction: ratio.direction.to_string(),
            });
        }
    }
}

fn check_storages(system: &EnergySystem, findings: &mut Findings) {
    for storage in &system.storages {
        let label = storage.label();
        check_bounds(
            &label,
            ["cap-lo-c", "cap-up-c", "inst-cap-c"],
            storage.energy(),
            system.features.min_cap,
            findings,
        );
        check_bounds(
            &label,
            ["cap-lo-p", "cap-up-p", "inst-cap-p"],
            storage.power(),
            system.features.min_cap,
            findings,
        );
    }
}

fn check_transmissions(system: &EnergySystem, findings: &mut Findings) {
    for line in &system.transmissions {
        check_bounds(
            &line.label(),
            ["cap-lo", "cap-up", "inst-cap"],
            line.capacity(),
            system.features.min_cap,
            findings,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::horizon::Horizon;
    use crate::process::Ratio;
    use crate::storage::{Storage, Transmission};
    use crate::system::Features;

    fn part_load_system(unit: Unit) -> EnergySystem {
        let mut system = EnergySystem::new(Horizon::new(4, 1.0));
        system.add_unit(unit);
        system.add_ratio(Ratio::input(2020, "Coal", "Coal", 2.2).with_ratio_min(2.6));
        system.add_ratio(Ratio::output(2020, "Coal", "Elec", 1.0));
        system
    }

    fn coal() -> Unit {
        Unit::new(2020, "Mid", "Coal")
            .with_capacity(0.0, 100.0)
            .with_min_fraction(0.4)
            .with_start_up(0.5, 0.1)
    }

    #[test]
    fn test_valid_system_has_no_issues() {
        let diagnostics = validate(&part_load_system(coal())).unwrap();
        assert!(!diagnostics.has_issues(), "{}", diagnostics);
    }

    #[test]
    fn test_capacity_bounds() {
        let err = validate(&part_load_system(coal().with_capacity(120.0, 100.0))).unwrap_err();
        assert!(matches!(err, ModelError::CapacityBounds { lo_name: "cap-lo", .. }));

        let err = validate(&part_load_system(coal().with_installed(150.0))).unwrap_err();
        assert!(matches!(err, ModelError::CapacityBounds { lo_name: "inst-cap", .. }));
    }

    #[test]
    fn test_min_fraction_range() {
        let err = validate(&part_load_system(coal().with_min_fraction(1.5))).unwrap_err();
        assert!(matches!(err, ModelError::MinFraction { .. }));

        let err = validate(&part_load_system(coal().with_min_fraction(1.0))).unwrap_err();
        assert!(matches!(err, ModelError::DegeneratePartLoad { .. }));
    }

    #[test]
    fn test_start_up_duration_range() {
        let err = validate(&part_load_system(coal().with_start_up(1.5, 0.1))).unwrap_err();
        assert!(matches!(err, ModelError::StartupDuration { .. }));
    }

    #[test]
    fn test_step_counts_must_be_whole() {
        let mut unit = coal();
        unit.min_con_op_time = 2.5;
        let err = validate(&part_load_system(unit)).unwrap_err();
        assert!(matches!(
            err,
            ModelError::NonInteger { parameter: "min-con-op-time", .. }
        ));

        let mut unit = coal();
        unit.pre_active_timesteps = -1.0;
        assert!(validate(&part_load_system(unit)).is_err());
    }

    #[test]
    fn test_infinite_cap_up_with_operating_state() {
        let err = validate(&part_load_system(coal().with_capacity(0.0, f64::INFINITY))).unwrap_err();
        assert!(matches!(err, ModelError::UnboundedBigM { parameter: "cap-up", .. }));

        // without the operating-state formulation the bound may stay open
        let system = part_load_system(coal().with_capacity(0.0, f64::INFINITY)).with_features(
            Features {
                part_load: false,
                ..Features::default()
            },
        );
        assert!(validate(&system).is_ok());
    }

    #[test]
    fn test_infinite_storage_bound_with_min_cap() {
        let mut system = part_load_system(coal()).with_features(Features {
            min_cap: true,
            ..Features::default()
        });
        system.add_storage(Storage::new(2020, "Mid", "Pump", "Elec").with_energy_capacity(
            10.0,
            100.0,
            0.0,
        ));
        let err = validate(&system).unwrap_err();
        assert!(matches!(err, ModelError::UnboundedBigM { parameter: "cap-up-p", .. }));
    }

    #[test]
    fn test_warnings() {
        let mut system = part_load_system(coal().with_capacity(0.0, 2e6).with_start_up(0.0, 0.0));
        system.add_transmission(Transmission::new(2020, "Mid", "South", "hvac", "Elec"));
        let diagnostics = validate(&system).unwrap();
        assert_eq!(diagnostics.warning_count(), 2, "{}", diagnostics);
        assert_eq!(diagnostics.issues_by_category("validation").count(), 2);
    }

    #[test]
    fn test_pinned_window_longer_than_horizon_warns() {
        let unit = coal().with_min_run(10, 2);
        let diagnostics = validate(&part_load_system(unit)).unwrap();
        assert_eq!(diagnostics.issues_by_category("horizon").count(), 1);
    }

    #[test]
    fn test_unknown_unit_and_duplicates() {
        let mut system = part_load_system(coal());
        system.add_ratio(Ratio::output(2020, "Nuclear", "Elec", 1.0));
        system.add_unit(coal());

        let diagnostics = inspect(&system);
        assert_eq!(diagnostics.error_count(), 2, "{}", diagnostics);
        assert!(diagnostics.errors().any(|i| i.message.contains("Nuclear")));
        assert!(diagnostics.errors().any(|i| i.message.contains("Duplicate unit")
            && i.entity.as_deref() == Some("2020.Mid.Coal")));
        // unknown-unit errors name a ratio, not an existing entity
        assert!(diagnostics
            .errors()
            .any(|i| i.message.contains("Nuclear") && i.entity.is_none()));
    }

    #[test]
    fn test_negative_ratio() {
        let mut system = part_load_system(coal());
        system.add_ratio(Ratio::output(2020, "Coal", "CO2", -0.3));
        let err = validate(&system).unwrap_err();
        assert!(matches!(err, ModelError::Negative { parameter: "ratio", .. }));
    }
}
