//! Extra qubits command.

use anyhow::Result;
use console::style;

use super::common::{self, ConnectionArgs, ProblemArgs};

/// Execute the extra-qubits command.
pub async fn execute(conn: &ConnectionArgs, problem: &ProblemArgs) -> Result<()> {
    let client = common::connect(conn, problem)?;

    let pb = common::spinner("Calculating extra qubits...");
    let extra = client.calculate_extra_qubits().await;
    pb.finish_and_clear();

    println!("{} Extra qubits: {}", style("✓").green().bold(), style(extra?).cyan());
    Ok(())
}
