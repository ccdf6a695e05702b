//! Circuit generation command.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use qsuper_core::ProblemResult;

use super::common::{self, ConnectionArgs, ProblemArgs};

/// Execute the circuit command.
pub async fn execute(
    conn: &ConnectionArgs,
    problem: &ProblemArgs,
    output: Option<&Path>,
    format: &str,
) -> Result<()> {
    let client = common::connect(conn, problem)?;

    let pb = common::spinner("Generating circuit...");
    let result = client.generate_circuit().await;
    pb.finish_and_clear();
    let result = result?;

    if let Some(path) = output {
        fs::write(path, result.qasm_code())
            .with_context(|| format!("Failed to write QASM to {}", path.display()))?;
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        "table" => print_summary(&result, output),
        other => anyhow::bail!("Unknown format: '{other}'. Available: table, json"),
    }
    Ok(())
}

fn print_summary(result: &ProblemResult, output: Option<&Path>) {
    let (num_qubits, index) = result.state();

    println!("{} Circuit generated", style("✓").green().bold());
    println!("  Metric:            {}", result.metric());
    println!(
        "  State:             {} ({} qubits, index {})",
        style(result.state_binary()).cyan(),
        num_qubits,
        index
    );
    if let Some(distances) = result.distances() {
        let list: Vec<String> = distances.iter().map(ToString::to_string).collect();
        println!("  Distances:         {}", list.join(", "));
    }
    if let Some((min, max)) = result.range() {
        println!("  Range:             [{min}, {max}]");
    }
    println!("  NaN allowed:       {}", result.is_nan_allowed());
    println!("  Ancilla mode:      {}", result.ancilla_mode());
    println!("  Extra qubits:      {}", style(result.extra_qubits()).yellow());
    println!("  Superposed states: {}", style(result.num_superposed()).yellow());

    match output {
        Some(path) => println!(
            "\n  OpenQASM {} written to {}",
            result.qasm_version(),
            style(path.display()).cyan()
        ),
        None => println!("\n{}", result.qasm_code()),
    }
}
