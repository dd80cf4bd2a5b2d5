pub mod read;
pub mod selectivity;
pub mod write;

use crate::error::Result;
use ringtail::engine::config::ResolvedOptions;
use ringtail::engine::resolver::OptionWarning;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

fn report_warnings(warnings: &[OptionWarning]) {
    for warning in warnings {
        warn!("{}", warning);
    }
}

/// Writes the resolved plan as pretty JSON to `target`, or to stdout.
fn emit_plan(resolved: &ResolvedOptions, target: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(resolved).map_err(anyhow::Error::from)?;
    match target {
        Some(path) => {
            let mut file = File::create(path)?;
            writeln!(file, "{}", json)?;
            info!("Resolved plan written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
