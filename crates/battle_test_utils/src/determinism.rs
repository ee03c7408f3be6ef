//! Determinism testing utilities.
//!
//! The engine is stochastic, but a fixed seed must reproduce a fixed outcome.
//! Outcomes are reduced to a hash so repeated runs can be compared cheaply
//! and reported compactly when they diverge.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use battle_core::error::Result;
use battle_core::outcome::BattleOutcome;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical outcomes.
    pub is_deterministic: bool,
    /// Outcome hash of each run.
    pub hashes: Vec<u64>,
    /// Seed every run used.
    pub seed: u32,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a reproducible seed).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different outcomes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Engine is not reproducible!\n\
                 Runs: {}\n\
                 Seed: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.seed,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Hash every field of an outcome.
#[must_use]
pub fn outcome_hash(outcome: &BattleOutcome) -> u64 {
    let mut hasher = DefaultHasher::new();
    outcome.seed.hash(&mut hasher);
    outcome.num_rounds.hash(&mut hasher);
    outcome.attackers().len().hash(&mut hasher);
    for combatant in outcome.combatants() {
        for round in combatant.rounds() {
            for (kind, stats) in round {
                kind.hash(&mut hasher);
                stats.hash(&mut hasher);
            }
        }
    }
    hasher.finish()
}

/// Run `run` `runs` times with `seed` and compare the outcomes.
///
/// # Errors
///
/// Returns the first error `run` produces.
///
/// # Example
///
/// ```ignore
/// use battle_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(5, 42, |seed| {
///     engine.battle(&attackers, &defenders, i64::from(seed), None)
/// })?;
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<F>(runs: usize, seed: u32, run: F) -> Result<DeterminismResult>
where
    F: Fn(u32) -> Result<BattleOutcome>,
{
    let mut hashes = Vec::with_capacity(runs);
    for _ in 0..runs {
        hashes.push(outcome_hash(&run(seed)?));
    }

    Ok(DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        seed,
    })
}
