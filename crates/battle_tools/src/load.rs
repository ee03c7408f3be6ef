//! Loading RON data files.

use std::path::Path;

use battle_client::ClientConfig;
use battle_core::attributes::AttributeTable;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::scenario::Scenario;

/// Read and deserialize a RON file.
pub fn read_ron<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|e| ToolError::io(path, e))?;
    ron::from_str(&text).map_err(|e| ToolError::DataParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a unit attribute table.
pub fn load_units(path: &Path) -> Result<AttributeTable> {
    let table: AttributeTable = read_ron(path)?;
    debug!(path = %path.display(), kinds = table.num_kinds(), "Loaded unit table");
    Ok(table)
}

/// Load a scenario.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let scenario: Scenario = read_ron(path)?;
    debug!(
        path = %path.display(),
        attackers = scenario.attackers.len(),
        defenders = scenario.defenders.len(),
        "Loaded scenario"
    );
    Ok(scenario)
}

/// Load client configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    path.map_or_else(|| Ok(ClientConfig::default()), read_ron)
}
