//! Distance range command.

use anyhow::Result;
use console::style;

use super::common::{self, ConnectionArgs, ProblemArgs};

/// Execute the distance-range command.
pub async fn execute(conn: &ConnectionArgs, problem: &ProblemArgs) -> Result<()> {
    let client = common::connect(conn, problem)?;

    let pb = common::spinner("Calculating distance range...");
    let range = client.calculate_distance_range().await;
    pb.finish_and_clear();

    let (min, max) = range?;
    println!(
        "{} Distance range: [{}, {}]",
        style("✓").green().bold(),
        style(min).cyan(),
        style(max).cyan()
    );
    Ok(())
}
