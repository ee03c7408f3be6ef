//! Aggregate statistics over a batch of outcomes.

use std::collections::BTreeMap;

use battle_core::combatant::Combatant;
use battle_core::outcome::{BattleOutcome, CombatantOutcome};
use battle_core::unit_kind::UnitKind;
use serde::{Deserialize, Serialize};

/// Final remaining units of one unit group across a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemainingUnitsStats {
    /// Units the group started with.
    pub initial: u64,
    /// Mean units left.
    pub mean: f64,
    /// Population standard deviation of units left.
    pub stdev: f64,
    /// Fewest units left in any run.
    pub min: u64,
    /// Most units left in any run.
    pub max: u64,
}

impl RemainingUnitsStats {
    fn from_samples(initial: u64, samples: &[u64]) -> Self {
        if samples.is_empty() {
            return Self {
                initial,
                mean: initial as f64,
                stdev: 0.0,
                min: initial,
                max: initial,
            };
        }

        let n = samples.len() as f64;
        let mean = samples.iter().map(|&s| s as f64).sum::<f64>() / n;
        let variance = samples
            .iter()
            .map(|&s| {
                let d = s as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        Self {
            initial,
            mean,
            stdev: variance.sqrt(),
            min: samples.iter().copied().min().unwrap_or(initial),
            max: samples.iter().copied().max().unwrap_or(initial),
        }
    }

    /// Mean fraction of the initial units that survived.
    pub fn survival_rate(&self) -> f64 {
        if self.initial == 0 {
            0.0
        } else {
            self.mean / self.initial as f64
        }
    }
}

/// Remaining-unit statistics of one combatant, per kind it brought.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatantSummary {
    /// Statistics keyed by unit kind.
    pub kinds: BTreeMap<UnitKind, RemainingUnitsStats>,
}

/// Summary of a batch of runs of the same rosters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of outcomes summarized.
    pub runs: usize,
    /// Mean number of rounds fought.
    pub mean_rounds: f64,
    /// One summary per attacker, in roster order.
    pub attackers: Vec<CombatantSummary>,
    /// One summary per defender, in roster order.
    pub defenders: Vec<CombatantSummary>,
}

impl BatchSummary {
    /// Summarize `outcomes`, all produced from `attackers` and `defenders`.
    ///
    /// A run that fought no rounds leaves every group at its initial count.
    pub fn from_outcomes(
        attackers: &[Combatant],
        defenders: &[Combatant],
        outcomes: &[BattleOutcome],
    ) -> Self {
        let mean_rounds = if outcomes.is_empty() {
            0.0
        } else {
            outcomes.iter().map(|o| f64::from(o.num_rounds)).sum::<f64>() / outcomes.len() as f64
        };

        Self {
            runs: outcomes.len(),
            mean_rounds,
            attackers: summarize_side(attackers, outcomes, BattleOutcome::attackers),
            defenders: summarize_side(defenders, outcomes, BattleOutcome::defenders),
        }
    }
}

fn summarize_side(
    roster: &[Combatant],
    outcomes: &[BattleOutcome],
    side: fn(&BattleOutcome) -> &[CombatantOutcome],
) -> Vec<CombatantSummary> {
    roster
        .iter()
        .enumerate()
        .map(|(index, combatant)| {
            let kinds = combatant
                .unit_groups()
                .iter()
                .map(|(&kind, &initial)| {
                    let samples: Vec<u64> = outcomes
                        .iter()
                        .map(|outcome| {
                            side(outcome)
                                .get(index)
                                .and_then(|c| c.remaining_units(kind))
                                .unwrap_or(initial)
                        })
                        .collect();
                    (kind, RemainingUnitsStats::from_samples(initial, &samples))
                })
                .collect();
            CombatantSummary { kinds }
        })
        .collect()
}
