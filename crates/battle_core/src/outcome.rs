//! Per-round statistics and battle outcomes decoded from engine output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};
use crate::unit_kind::UnitKind;

/// Statistics of one unit group (all units of one kind of one combatant)
/// for a single round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitGroupStats {
    /// Shots fired by the group.
    pub times_fired: u64,
    /// Shots received by the group.
    pub times_was_shot: u64,
    /// Damage dealt to enemy shields.
    pub shield_damage_dealt: u64,
    /// Damage dealt to enemy hulls.
    pub hull_damage_dealt: u64,
    /// Damage absorbed by the group's shields.
    pub shield_damage_taken: u64,
    /// Damage taken by the group's hulls.
    pub hull_damage_taken: u64,
    /// Units still alive at the end of the round.
    pub num_remaining_units: u64,
}

impl UnitGroupStats {
    /// Number of integers one group occupies in engine output.
    pub const FIELD_COUNT: usize = 7;

    /// Build from the engine's field order.
    pub fn from_fields(fields: [u64; Self::FIELD_COUNT]) -> Self {
        let [times_fired, times_was_shot, shield_damage_dealt, hull_damage_dealt, shield_damage_taken, hull_damage_taken, num_remaining_units] =
            fields;
        Self {
            times_fired,
            times_was_shot,
            shield_damage_dealt,
            hull_damage_dealt,
            shield_damage_taken,
            hull_damage_taken,
            num_remaining_units,
        }
    }

    /// Fields in the engine's output order.
    pub fn to_fields(&self) -> [u64; Self::FIELD_COUNT] {
        [
            self.times_fired,
            self.times_was_shot,
            self.shield_damage_dealt,
            self.hull_damage_dealt,
            self.shield_damage_taken,
            self.hull_damage_taken,
            self.num_remaining_units,
        ]
    }
}

/// Statistics of every unit kind in one round.
pub type RoundStats = BTreeMap<UnitKind, UnitGroupStats>;

/// Round-by-round statistics of one combatant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatantOutcome {
    rounds: Vec<RoundStats>,
}

impl CombatantOutcome {
    /// Wrap per-round statistics, first round first.
    pub fn new(rounds: Vec<RoundStats>) -> Self {
        Self { rounds }
    }

    /// Statistics of round `round` (0-based).
    pub fn round_stats(&self, round: usize) -> Option<&RoundStats> {
        self.rounds.get(round)
    }

    /// All rounds, first round first.
    pub fn rounds(&self) -> &[RoundStats] {
        &self.rounds
    }

    /// Number of recorded rounds.
    pub fn num_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// Statistics after the last round, `None` if no round was fought.
    pub fn final_stats(&self) -> Option<&RoundStats> {
        self.rounds.last()
    }

    /// Units of `kind` left after the last round.
    pub fn remaining_units(&self, kind: UnitKind) -> Option<u64> {
        self.final_stats()
            .map(|stats| stats.get(&kind).map_or(0, |s| s.num_remaining_units))
    }

    /// Check that no unit group grows from one round to the next.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::MalformedOutput`] naming the first kind whose
    /// remaining count increased.
    pub fn check_remaining_units(&self) -> Result<()> {
        for (round, pair) in self.rounds.windows(2).enumerate() {
            let (before, after) = (&pair[0], &pair[1]);
            for (kind, stats) in after {
                let previous = before.get(kind).map_or(0, |s| s.num_remaining_units);
                if stats.num_remaining_units > previous {
                    return Err(BattleError::MalformedOutput(format!(
                        "{kind} grew from {previous} to {} units in round {}",
                        stats.num_remaining_units,
                        round + 2
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Result of one engagement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// Seed the engine ran with.
    pub seed: u32,
    /// Number of rounds fought.
    pub num_rounds: u32,
    /// One outcome per attacker, in roster order.
    pub attackers_outcomes: Vec<CombatantOutcome>,
    /// One outcome per defender, in roster order.
    pub defenders_outcomes: Vec<CombatantOutcome>,
}

impl BattleOutcome {
    /// Attacker outcomes, in roster order.
    pub fn attackers(&self) -> &[CombatantOutcome] {
        &self.attackers_outcomes
    }

    /// Defender outcomes, in roster order.
    pub fn defenders(&self) -> &[CombatantOutcome] {
        &self.defenders_outcomes
    }

    /// Every combatant outcome, attackers first.
    pub fn combatants(&self) -> impl Iterator<Item = &CombatantOutcome> {
        self.attackers_outcomes.iter().chain(&self.defenders_outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(remaining: &[u64]) -> RoundStats {
        remaining
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                (
                    UnitKind::new(i as u8),
                    UnitGroupStats {
                        num_remaining_units: n,
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_fields_order() {
        let stats = UnitGroupStats::from_fields([1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(stats.times_fired, 1);
        assert_eq!(stats.hull_damage_dealt, 4);
        assert_eq!(stats.shield_damage_taken, 5);
        assert_eq!(stats.num_remaining_units, 7);
        assert_eq!(stats.to_fields(), [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_remaining_units_accessors() {
        let outcome = CombatantOutcome::new(vec![round(&[10, 4]), round(&[7, 0])]);
        assert_eq!(outcome.num_rounds(), 2);
        assert_eq!(outcome.remaining_units(UnitKind::new(0)), Some(7));
        assert_eq!(outcome.remaining_units(UnitKind::new(1)), Some(0));
        assert_eq!(outcome.remaining_units(UnitKind::new(9)), Some(0));
        assert_eq!(CombatantOutcome::default().remaining_units(UnitKind::new(0)), None);
    }

    #[test]
    fn test_non_increasing_check() {
        let ok = CombatantOutcome::new(vec![round(&[10, 4]), round(&[10, 3]), round(&[2, 3])]);
        assert!(ok.check_remaining_units().is_ok());

        let bad = CombatantOutcome::new(vec![round(&[10, 4]), round(&[9, 5])]);
        let err = bad.check_remaining_units().unwrap_err();
        assert_eq!(
            err,
            BattleError::MalformedOutput("UnitKind(1) grew from 4 to 5 units in round 2".into())
        );
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = BattleOutcome {
            seed: 42,
            num_rounds: 1,
            attackers_outcomes: vec![CombatantOutcome::new(vec![round(&[3])])],
            defenders_outcomes: vec![],
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains(r#""seed":42"#));
        assert!(json.contains(r#""num_remaining_units":3"#));

        let back: BattleOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }
}
