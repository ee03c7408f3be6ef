//! Data file validation.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::load::{load_scenario, load_units};

/// What a successful validation checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Unit kinds in the table.
    pub num_kinds: usize,
    /// Attackers in the scenario, if one was checked.
    pub num_attackers: Option<usize>,
    /// Defenders in the scenario, if one was checked.
    pub num_defenders: Option<usize>,
}

/// Validate a unit table and, optionally, a scenario against it.
///
/// # Errors
///
/// Returns an error if either file fails to load or the scenario references
/// kinds the table lacks.
pub fn validate_files(units: &Path, scenario: Option<&Path>) -> Result<ValidationReport> {
    let table = load_units(units)?;
    info!(kinds = table.num_kinds(), "Unit table is valid");

    let mut report = ValidationReport {
        num_kinds: table.num_kinds(),
        num_attackers: None,
        num_defenders: None,
    };

    if let Some(path) = scenario {
        let scenario = load_scenario(path)?;
        scenario.validate(&table)?;
        info!(
            attackers = scenario.attackers.len(),
            defenders = scenario.defenders.len(),
            "Scenario is valid"
        );
        report.num_attackers = Some(scenario.attackers.len());
        report.num_defenders = Some(scenario.defenders.len());
    }

    Ok(report)
}
