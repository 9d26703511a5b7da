use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ucx", author, version, about, long_about = None)]
pub struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a scenario and list every finding
    Check {
        /// Scenario TOML file
        scenario: PathBuf,
    },
    /// Assemble the model and report variables, constraints and big-M constants
    Audit {
        /// Scenario TOML file
        scenario: PathBuf,
        /// Print the big-M table as JSON
        #[arg(long)]
        json: bool,
    },
    /// Assemble and solve a scenario
    Solve {
        /// Scenario TOML file
        scenario: PathBuf,
        /// Solver backend, overrides `solver.kind`
        #[arg(long)]
        solver: Option<String>,
        /// Solve the LP relaxation
        #[arg(long)]
        relax: bool,
        /// Write the solution as JSON
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}
