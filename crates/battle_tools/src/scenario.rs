//! Scenario files: the two sides of an engagement.

use battle_core::attributes::AttributeTable;
use battle_core::combatant::{validate_roster, Combatant, Side};
use battle_core::error::Result;
use serde::{Deserialize, Serialize};

/// Attackers and defenders of one engagement.
///
/// # Example RON
///
/// ```ron
/// Scenario(
///     attackers: [Combatant(weapons_technology: 10, unit_groups: {5: 100})],
///     defenders: [Combatant(unit_groups: {14: 500})],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Attacking combatants, in roster order.
    #[serde(default)]
    pub attackers: Vec<Combatant>,
    /// Defending combatants, in roster order.
    #[serde(default)]
    pub defenders: Vec<Combatant>,
}

impl Scenario {
    /// Check both sides against `table`.
    pub fn validate(&self, table: &AttributeTable) -> Result<()> {
        validate_roster(table, &self.attackers, Side::Attackers)?;
        validate_roster(table, &self.defenders, Side::Defenders)
    }

    /// Total units each side brings, attackers first.
    pub fn total_units(&self) -> (u64, u64) {
        let total = |side: &[Combatant]| {
            side.iter()
                .flat_map(|c| c.unit_groups().values())
                .fold(0u64, |acc, &n| acc.saturating_add(n))
        };
        (total(&self.attackers), total(&self.defenders))
    }
}
