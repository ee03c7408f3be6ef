//! JSON reports written by `battle-sim`.

use std::fmt::Write as _;
use std::path::Path;

use battle_client::BatchSummary;
use battle_core::attributes::AttributeTable;
use battle_core::outcome::BattleOutcome;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};
use crate::scenario::Scenario;

/// Report of a batch simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Seed the caller asked for (0 = drawn per run).
    pub requested_seed: i64,
    /// Seed each run used, in run order.
    pub seeds: Vec<u32>,
    /// Aggregate statistics.
    pub summary: BatchSummary,
    /// Full outcomes, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcomes: Option<Vec<BattleOutcome>>,
}

impl SimulationReport {
    /// Build a report from the outcomes of `scenario`.
    pub fn new(
        scenario: &Scenario,
        requested_seed: i64,
        outcomes: Vec<BattleOutcome>,
        keep_outcomes: bool,
    ) -> Self {
        let summary =
            BatchSummary::from_outcomes(&scenario.attackers, &scenario.defenders, &outcomes);
        Self {
            requested_seed,
            seeds: outcomes.iter().map(|o| o.seed).collect(),
            summary,
            outcomes: keep_outcomes.then_some(outcomes),
        }
    }
}

/// Serialize `value` as pretty JSON to `path`, or stdout when `path` is `None`.
pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| ToolError::io(parent, e))?;
            }
            std::fs::write(path, json).map_err(|e| ToolError::io(path, e))
        }
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

/// Human-readable table of a batch summary.
pub fn render_summary(table: &AttributeTable, summary: &BatchSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} runs, {:.2} rounds on average",
        summary.runs, summary.mean_rounds
    );

    let sides = [("Attacker", &summary.attackers), ("Defender", &summary.defenders)];
    for (label, side) in sides {
        for (i, combatant) in side.iter().enumerate() {
            let _ = writeln!(out, "{label} {i}:");
            for (&kind, stats) in &combatant.kinds {
                let _ = writeln!(
                    out,
                    "  {:<20} {:>10} -> {:>12.1} ± {:<10.1} [{} .. {}]",
                    table.display_name(kind),
                    stats.initial,
                    stats.mean,
                    stats.stdev,
                    stats.min,
                    stats.max
                );
            }
        }
    }
    out
}
