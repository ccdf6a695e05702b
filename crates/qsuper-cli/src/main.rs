//! qsuper Command-Line Interface
//!
//! Front-end for the quantum-state superposition service.
//!
//! ```text
//! qsuper circuit --metric euclidean --qubits 4 --index 3 \
//!     --distances 1/2,inf --with-nan true --output superposition.qasm
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::{ConnectionArgs, ProblemArgs};
use commands::{circuit, distance_range, extra_qubits, num_superposed};

/// qsuper - superposition circuits from the cloud
#[derive(Parser)]
#[command(name = "qsuper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate how many extra qubits the circuit needs
    ExtraQubits {
        #[command(flatten)]
        problem: ProblemArgs,
    },

    /// Calculate the range of distances reachable from the state
    DistanceRange {
        #[command(flatten)]
        problem: ProblemArgs,
    },

    /// Generate the superposition circuit
    Circuit {
        #[command(flatten)]
        problem: ProblemArgs,

        /// Write the QASM code to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Count the basis states in the superposition
    NumSuperposed {
        #[command(flatten)]
        problem: ProblemArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let conn = &cli.connection;
    let result = match &cli.command {
        Commands::ExtraQubits { problem } => extra_qubits::execute(conn, problem).await,
        Commands::DistanceRange { problem } => distance_range::execute(conn, problem).await,
        Commands::Circuit {
            problem,
            output,
            format,
        } => circuit::execute(conn, problem, output.as_deref(), format).await,
        Commands::NumSuperposed { problem } => num_superposed::execute(conn, problem).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
