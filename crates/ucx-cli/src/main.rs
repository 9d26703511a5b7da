use clap::Parser;
use tracing_subscriber::EnvFilter;
use ucx_cli::cli::{Cli, Commands};

mod commands;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Check { scenario } => commands::check::handle(scenario),
        Commands::Audit { scenario, json } => commands::audit::handle(scenario, *json),
        Commands::Solve {
            scenario,
            solver,
            relax,
            out,
        } => commands::solve::handle(scenario, solver.as_deref(), *relax, out.as_deref()),
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
