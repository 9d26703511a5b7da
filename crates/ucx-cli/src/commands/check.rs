//! `ucx check`: validate a scenario without assembling a model.

use anyhow::{bail, Result};
use std::io::{self, Write};
use std::path::Path;
use tabwriter::TabWriter;
use tracing::info;
use ucx_cli::scenario::Scenario;
use ucx_core::validation::inspect;
use ucx_core::{Diagnostics, Severity};

pub fn handle(path: &Path) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let system = &scenario.system;
    info!("checking {}", path.display());

    println!(
        "Scenario {}: {} units, {} ratios, {} storages, {} transmissions, {} steps",
        path.display(),
        system.units.len(),
        system.ratios.len(),
        system.storages.len(),
        system.transmissions.len(),
        system.horizon.steps
    );

    let mut diagnostics = inspect(system);
    if !diagnostics.has_errors() {
        // fixes are only resolvable against a valid system
        if let Err(err) = scenario.fixed_values() {
            diagnostics.add_error("fix", &format!("{:#}", err));
        }
    }
    print_diagnostics(&diagnostics)?;

    if diagnostics.has_errors() {
        bail!(
            "scenario has {} configuration error(s)",
            diagnostics.error_count()
        );
    }
    Ok(())
}

fn print_diagnostics(diagnostics: &Diagnostics) -> Result<()> {
    println!("Diagnostics: {}", diagnostics.summary());
    if !diagnostics.has_issues() {
        return Ok(());
    }
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "SEVERITY\tCATEGORY\tENTITY\tSTEP\tMESSAGE")?;
    for issue in &diagnostics.issues {
        let severity = match issue.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            severity,
            issue.category,
            issue.entity.as_deref().unwrap_or("-"),
            issue
                .step
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            issue.message
        )?;
    }
    writer.flush()?;
    Ok(())
}
