//! `ucx audit`: assemble a model and report its size, per-unit formulation
//! and big-M constants.

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;
use tabwriter::TabWriter;
use ucx_cli::scenario::Scenario;
use ucx_milp::plan::GradientRule;
use ucx_milp::{AssembledModel, VarFamily};

pub fn handle(path: &Path, json: bool) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let mut model = scenario
        .solver
        .builder(&scenario.system)
        .build()
        .context("assembling model")?;
    scenario.apply_fixes(&mut model)?;

    if json {
        let table = serde_json::to_string_pretty(model.big_m_audit())
            .context("serializing big-M audit")?;
        println!("{}", table);
        return Ok(());
    }

    println!(
        "Model: {} variables ({} boolean), {} constraints",
        model.variable_count(),
        model.boolean_count(),
        model.constraint_count()
    );
    print_units(&model)?;
    print_sizes(&model)?;
    print_big_m(&model)?;
    Ok(())
}

fn print_units(model: &AssembledModel) -> Result<()> {
    println!("\nUnits:");
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "UNIT\tPART-LOAD\tGRADIENT\tMIN-RUN\tPINNED\tTAPER")?;
    for plan in model.plans() {
        let gradient = match plan.gradient {
            GradientRule::Unlimited => "-".to_string(),
            GradientRule::Plain { max_grad } => format!("{}", max_grad),
            GradientRule::StartupExceptions { max_grad } => format!("{} (exceptions)", max_grad),
        };
        let (min_run, pinned) = match plan.operating {
            Some(operating) => (
                operating.min_uptime.to_string(),
                operating.pinned_steps.to_string(),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        writeln!(
            writer,
            "{}\t{:?}\t{}\t{}\t{}\t{}",
            plan.label,
            plan.part_load,
            gradient,
            min_run,
            pinned,
            plan.taper_factor
                .map(|f| format!("{:.3}", f))
                .unwrap_or_else(|| "-".to_string())
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn print_sizes(model: &AssembledModel) -> Result<()> {
    println!("\nVariables:");
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "FAMILY\tCOUNT")?;
    for family in VarFamily::ALL {
        let count = model.arena().count_of(family);
        if count > 0 {
            writeln!(writer, "{}\t{}", family, count)?;
        }
    }
    writer.flush()?;

    println!("\nConstraints:");
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "FAMILY\tCOUNT")?;
    for (family, count) in model.family_counts() {
        writeln!(writer, "{}\t{}", family, count)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_big_m(model: &AssembledModel) -> Result<()> {
    println!("\nBig-M constants:");
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "FAMILY\tENTITY\tCOMMODITY\tVALUE")?;
    for entry in model.big_m_audit() {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            entry.family,
            entry.entity,
            entry.commodity.as_deref().unwrap_or("-"),
            entry.value
        )?;
    }
    writer.flush()?;
    Ok(())
}
