//! Superposed state count command.

use anyhow::Result;
use console::style;

use super::common::{self, ConnectionArgs, ProblemArgs};

/// Execute the num-superposed command.
pub async fn execute(conn: &ConnectionArgs, problem: &ProblemArgs) -> Result<()> {
    let client = common::connect(conn, problem)?;

    let pb = common::spinner("Counting superposed states...");
    let total = client.calculate_num_superposed().await;
    pb.finish_and_clear();

    println!(
        "{} Superposed states: {}",
        style("✓").green().bold(),
        style(total?).cyan()
    );
    Ok(())
}
