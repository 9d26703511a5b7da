//! Discrete capacity sizing, storage and transmission build flags, gradient
//! penalty.

use good_lp::constraint;
use ucx_core::{EnergySystem, Features, Horizon, Ratio, Storage, Transmission, Unit};
use ucx_milp::{
    ConstraintFamily, ModelBuilder, Owner, SolveStatus, SolverConfig, VarFamily, VarKey,
};

const TOL: f64 = 1e-5;

fn min_cap() -> Features {
    Features {
        min_cap: true,
        ..Features::default()
    }
}

fn sized_unit_system() -> EnergySystem {
    let mut system = EnergySystem::new(Horizon::new(2, 1.0)).with_features(min_cap());
    system.add_unit(Unit::new(2020, "South", "Biomass").with_capacity(5.0, 20.0));
    system.add_ratio(Ratio::output(2020, "Biomass", "Elec", 1.0));
    system
}

#[test]
fn test_small_demand_rounds_up_to_minimum_capacity() {
    let system = sized_unit_system();
    let mut model = ModelBuilder::new(&system).build().unwrap();
    assert_eq!(model.arena().count_of(VarFamily::Build), 1);

    let cap_key = VarKey::entity(VarFamily::Capacity, Owner::Unit(0));
    let cap = model.var(&cap_key).unwrap();
    let tau = model
        .var(&VarKey::at(VarFamily::Throughput, Owner::Unit(0), 1))
        .unwrap();
    model.add_constraint(constraint!(tau >= 3.0));
    model.add_objective(1.0 * cap);

    let solution = model.solve(&SolverConfig::default()).unwrap();
    assert_eq!(solution.status, SolveStatus::Optimal);
    assert!((solution.value(&cap_key).unwrap() - 5.0).abs() < TOL);
    assert_eq!(solution.is_built(Owner::Unit(0)), Some(true));
}

#[test]
fn test_unused_unit_is_not_built() {
    let system = sized_unit_system();
    let mut model = ModelBuilder::new(&system).build().unwrap();
    let cap_key = VarKey::entity(VarFamily::Capacity, Owner::Unit(0));
    let cap = model.var(&cap_key).unwrap();
    model.add_objective(1.0 * cap);

    let solution = model.solve(&SolverConfig::default()).unwrap();
    assert!(solution.value(&cap_key).unwrap().abs() < TOL);
    assert_eq!(solution.is_built(Owner::Unit(0)), Some(false));
    assert!(solution.summary().contains("[SKIP]"));
}

#[test]
fn test_capacity_between_zero_and_minimum_is_infeasible() {
    let system = sized_unit_system();
    let mut model = ModelBuilder::new(&system).build().unwrap();
    model
        .fix(VarKey::entity(VarFamily::Capacity, Owner::Unit(0)), 2.0)
        .unwrap();
    let solution = model.solve(&SolverConfig::default()).unwrap();
    assert_eq!(solution.status, SolveStatus::Infeasible);
}

#[test]
fn test_without_min_cap_capacity_is_continuous() {
    let mut system = sized_unit_system();
    system.features.min_cap = false;
    let mut model = ModelBuilder::new(&system).build().unwrap();
    assert_eq!(model.arena().count_of(VarFamily::Build), 0);
    model
        .fix(VarKey::entity(VarFamily::Capacity, Owner::Unit(0)), 5.0)
        .unwrap();
    let solution = model.solve(&SolverConfig::default()).unwrap();
    assert_eq!(solution.status, SolveStatus::Optimal);
    assert_eq!(solution.is_built(Owner::Unit(0)), None);
}

#[test]
fn test_storage_energy_and_power_share_build_flag() {
    let mut system = EnergySystem::new(Horizon::new(1, 1.0)).with_features(min_cap());
    system.add_storage(
        Storage::new(2020, "Mid", "Battery", "Elec")
            .with_energy_capacity(10.0, 100.0, 0.0)
            .with_power_capacity(5.0, 50.0, 0.0),
    );
    let mut model = ModelBuilder::new(&system).build().unwrap();
    assert_eq!(model.arena().count_of(VarFamily::Build), 1);
    assert_eq!(model.family_count(ConstraintFamily::CapacityBounds), 4);

    let energy_key = VarKey::entity(VarFamily::Capacity, Owner::Storage(0));
    let power_key = VarKey::entity(VarFamily::PowerCapacity, Owner::Storage(0));
    let energy = model.var(&energy_key).unwrap();
    let power = model.var(&power_key).unwrap();
    model.add_constraint(constraint!(power >= 1.0));
    model.add_objective(energy + power);

    let solution = model.solve(&SolverConfig::default()).unwrap();
    assert_eq!(solution.status, SolveStatus::Optimal);
    assert!((solution.value(&energy_key).unwrap() - 10.0).abs() < TOL);
    assert!((solution.value(&power_key).unwrap() - 5.0).abs() < TOL);
    assert_eq!(solution.is_built(Owner::Storage(0)), Some(true));
    assert!(solution
        .summary()
        .contains("2020.Mid.Battery.Elec: 10.000 MWh / 5.000 MW"));
}

#[test]
fn test_transmission_with_installed_capacity_is_built() {
    let mut system = EnergySystem::new(Horizon::new(1, 1.0)).with_features(min_cap());
    system.add_transmission(
        Transmission::new(2020, "Mid", "South", "hvac", "Elec").with_capacity(2.0, 8.0, 3.0),
    );
    let mut model = ModelBuilder::new(&system).build().unwrap();
    let cap_key = VarKey::entity(VarFamily::Capacity, Owner::Transmission(0));
    let cap = model.var(&cap_key).unwrap();
    model.add_objective(1.0 * cap);

    let solution = model.solve(&SolverConfig::default()).unwrap();
    assert!((solution.value(&cap_key).unwrap() - 3.0).abs() < TOL);
    assert_eq!(solution.is_built(Owner::Transmission(0)), Some(true));

    let audit = ModelBuilder::new(&system).build().unwrap();
    assert!(audit
        .big_m_audit()
        .iter()
        .any(|e| e.family == ConstraintFamily::CapacityBounds && e.value == 8.0));
}

#[test]
fn test_gradient_penalty_sums_absolute_changes() {
    let mut system = EnergySystem::new(Horizon::new(2, 1.0)).with_features(Features {
        gradient_penalty: true,
        ..Features::default()
    });
    system.add_unit(
        Unit::new(2020, "Mid", "Hydro")
            .with_fixed_capacity(10.0)
            .with_grad_penalty(2.0),
    );
    system.add_ratio(Ratio::output(2020, "Hydro", "Elec", 1.0));

    let mut model = ModelBuilder::new(&system).build().unwrap();
    assert_eq!(model.family_count(ConstraintFamily::GradientPenalty), 2);
    model
        .fix(VarKey::at(VarFamily::Throughput, Owner::Unit(0), 1), 4.0)
        .unwrap();
    model
        .fix(VarKey::at(VarFamily::Throughput, Owner::Unit(0), 2), 1.0)
        .unwrap();

    let solution = model.solve(&SolverConfig::default()).unwrap();
    assert_eq!(solution.status, SolveStatus::Optimal);
    // t0 follows t1 for free, then 2·|1 − 4|
    let penalty = solution.gradient_penalty.unwrap();
    assert!((penalty - 6.0).abs() < TOL, "penalty {}", penalty);
}

#[test]
fn test_gradient_penalty_ignored_when_feature_off() {
    let mut system = EnergySystem::new(Horizon::new(2, 1.0));
    system.add_unit(
        Unit::new(2020, "Mid", "Hydro")
            .with_fixed_capacity(10.0)
            .with_grad_penalty(2.0),
    );
    system.add_ratio(Ratio::output(2020, "Hydro", "Elec", 1.0));
    let model = ModelBuilder::new(&system).build().unwrap();
    assert_eq!(model.family_count(ConstraintFamily::GradientPenalty), 0);
    assert_eq!(model.arena().count_of(VarFamily::RampUp), 0);
}

#[test]
fn test_relaxed_model_keeps_booleans_continuous() {
    let system = sized_unit_system();
    let config = SolverConfig {
        relax_integrality: true,
        ..SolverConfig::default()
    };
    let mut model = config.builder(&system).build().unwrap();
    assert!(model.arena().relaxes_integrality());

    let cap_key = VarKey::entity(VarFamily::Capacity, Owner::Unit(0));
    let cap = model.var(&cap_key).unwrap();
    let tau = model
        .var(&VarKey::at(VarFamily::Throughput, Owner::Unit(0), 1))
        .unwrap();
    model.add_constraint(constraint!(tau >= 3.0));
    model.add_objective(1.0 * cap);

    // the relaxation sizes exactly to demand with a fractional build flag
    let solution = model.solve(&config).unwrap();
    assert!((solution.value(&cap_key).unwrap() - 3.0).abs() < TOL);
    assert_eq!(solution.status, SolveStatus::NumericallySuspect);
    assert_eq!(solution.integrality_violations().len(), 1);
}
