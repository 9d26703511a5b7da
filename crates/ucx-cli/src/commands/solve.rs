//! `ucx solve`: assemble, pin fixed trajectories, solve and report.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;
use ucx_cli::scenario::Scenario;
use ucx_core::EnergySystem;
use ucx_milp::{MilpSolverKind, ModelSolution, Owner, VarFamily, VarKey};

/// Solution output format
#[derive(Debug, Serialize)]
struct SolveOutput {
    status: String,
    solver: String,
    solve_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    startup_energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gradient_penalty: Option<f64>,
    capacities: Vec<CapacityOutput>,
    units: Vec<UnitOutput>,
    integrality_violations: usize,
}

#[derive(Debug, Serialize)]
struct CapacityOutput {
    entity: String,
    capacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    power: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    built: Option<bool>,
}

#[derive(Debug, Serialize)]
struct UnitOutput {
    unit: String,
    throughput: Vec<(u32, f64)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    run: Vec<(u32, f64)>,
    startups: usize,
}

pub fn handle(path: &Path, solver: Option<&str>, relax: bool, out: Option<&Path>) -> Result<()> {
    let mut scenario = Scenario::load(path)?;
    if let Some(label) = solver {
        scenario.solver.kind = label.parse::<MilpSolverKind>()?;
    }
    scenario.solver.relax_integrality |= relax;

    let mut model = scenario
        .solver
        .builder(&scenario.system)
        .build()
        .context("assembling model")?;
    let fixed = scenario.apply_fixes(&mut model)?;
    if fixed > 0 {
        info!("pinned {} variables", fixed);
    }

    let solution = model
        .solve(&scenario.solver)
        .context("solving model")?;
    print!("{}", solution.summary());

    if let Some(out) = out {
        let output = build_output(&scenario.system, &solution);
        let json = serde_json::to_string_pretty(&output).context("serializing solution")?;
        let mut file = File::create(out)
            .with_context(|| format!("creating output file: {}", out.display()))?;
        file.write_all(json.as_bytes()).context("writing output")?;
        println!("\nResults written to {}", out.display());
    }
    Ok(())
}

fn build_output(system: &EnergySystem, solution: &ModelSolution) -> SolveOutput {
    let mut capacities = Vec::new();
    let mut units = Vec::new();
    for (i, unit) in system.units.iter().enumerate() {
        let owner = Owner::Unit(i);
        if let Some(capacity) = solution.value(&VarKey::entity(VarFamily::Capacity, owner)) {
            capacities.push(CapacityOutput {
                entity: unit.label(),
                capacity,
                power: None,
                built: solution.is_built(owner),
            });
        }
        let throughput = solution.series(VarFamily::Throughput, owner, None);
        if !throughput.is_empty() {
            units.push(UnitOutput {
                unit: unit.label(),
                throughput,
                run: solution.series(VarFamily::Run, owner, None),
                startups: solution.startup_count(i),
            });
        }
    }
    for (i, storage) in system.storages.iter().enumerate() {
        let owner = Owner::Storage(i);
        if let Some(capacity) = solution.value(&VarKey::entity(VarFamily::Capacity, owner)) {
            capacities.push(CapacityOutput {
                entity: storage.label(),
                capacity,
                power: solution.value(&VarKey::entity(VarFamily::PowerCapacity, owner)),
                built: solution.is_built(owner),
            });
        }
    }
    for (i, line) in system.transmissions.iter().enumerate() {
        let owner = Owner::Transmission(i);
        if let Some(capacity) = solution.value(&VarKey::entity(VarFamily::Capacity, owner)) {
            capacities.push(CapacityOutput {
                entity: line.label(),
                capacity,
                power: None,
                built: solution.is_built(owner),
            });
        }
    }

    SolveOutput {
        status: solution.status.to_string(),
        solver: solution.solver.to_string(),
        solve_time_ms: solution.solve_time.as_millis() as u64,
        startup_energy: solution.startup_energy,
        gradient_penalty: solution.gradient_penalty,
        capacities,
        units,
        integrality_violations: solution.integrality_violations().len(),
    }
}
