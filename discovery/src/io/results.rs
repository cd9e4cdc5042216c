//! Result file persistence (`results/discovered_scenarios.json`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::core::types::DiscoveredScenarios;

/// Serialize the discovered scenarios as pretty JSON, replacing any prior file.
pub fn write_results(path: &Path, scenarios: &DiscoveredScenarios) -> Result<()> {
    debug!(path = %path.display(), scenarios = scenarios.len(), "writing results");
    let mut buf = serde_json::to_string_pretty(scenarios).context("serialize results")?;
    buf.push('\n');
    super::write_atomic(path, &buf)?;
    info!(path = %path.display(), scenarios = scenarios.len(), "results saved");
    Ok(())
}

/// Load a results file written by [`write_results`].
pub fn load_results(path: &Path) -> Result<DiscoveredScenarios> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read results {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse results {}", path.display()))
}
