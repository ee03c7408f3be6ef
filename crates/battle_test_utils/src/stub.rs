//! In-memory engines and engine output rendering.
//!
//! Lets client tests exercise encode, run and decode without spawning
//! anything.

use std::sync::Mutex;
use std::time::Duration;

use battle_client::engine::{Engine, EngineOutput};
use battle_core::error::Result;
use battle_core::outcome::{BattleOutcome, CombatantOutcome, UnitGroupStats};
use battle_core::unit_kind::UnitKind;

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCall {
    /// Seed the engine was given.
    pub seed: u32,
    /// Payload written to stdin.
    pub input: Vec<u8>,
    /// Time limit the run was given.
    pub timeout: Option<Duration>,
}

/// Engine backed by a closure from `(seed, input)` to a result.
///
/// Every call is recorded in order of arrival.
pub struct StubEngine<F> {
    respond: F,
    calls: Mutex<Vec<EngineCall>>,
}

impl<F> StubEngine<F>
where
    F: Fn(u32, &[u8]) -> Result<EngineOutput> + Send + Sync,
{
    /// Wrap `respond`.
    pub fn new(respond: F) -> Self {
        Self {
            respond,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls seen so far, in arrival order.
    ///
    /// # Panics
    ///
    /// Panics if a previous call panicked while recording.
    #[must_use]
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Seeds seen so far, sorted ascending.
    #[must_use]
    pub fn seeds_sorted(&self) -> Vec<u32> {
        let mut seeds: Vec<u32> = self.calls().iter().map(|c| c.seed).collect();
        seeds.sort_unstable();
        seeds
    }
}

impl<F> Engine for StubEngine<F>
where
    F: Fn(u32, &[u8]) -> Result<EngineOutput> + Send + Sync,
{
    fn run(&self, seed: u32, input: &[u8], timeout: Option<Duration>) -> Result<EngineOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(EngineCall {
                seed,
                input: input.to_vec(),
                timeout,
            });
        }
        (self.respond)(seed, input)
    }
}

/// Engine that always prints the same text.
pub fn fixed_output(
    text: impl Into<String>,
) -> StubEngine<impl Fn(u32, &[u8]) -> Result<EngineOutput> + Send + Sync> {
    let text = text.into();
    StubEngine::new(move |_, _| Ok(EngineOutput::new(text.clone())))
}

/// Render `outcome` the way the engine prints it.
///
/// Kinds missing from a round are printed as all zeros. Every combatant must
/// have exactly `outcome.num_rounds` rounds.
#[must_use]
pub fn render_output(outcome: &BattleOutcome, num_kinds: usize) -> String {
    let mut tokens = vec![outcome.num_rounds.to_string()];
    for combatant in outcome.combatants() {
        for round in combatant.rounds() {
            for kind in UnitKind::all(num_kinds) {
                let stats = round.get(&kind).copied().unwrap_or_default();
                tokens.extend(stats.to_fields().iter().map(u64::to_string));
            }
        }
    }
    tokens.join(" ")
}

/// Outcome where every combatant keeps `remaining[i]` units of kind `i` for
/// `num_rounds` rounds, with the other counters derived from the round.
#[must_use]
pub fn steady_outcome(
    seed: u32,
    num_rounds: u32,
    num_attackers: usize,
    num_defenders: usize,
    remaining: &[u64],
) -> BattleOutcome {
    let combatant = |salt: u64| {
        let rounds = (0..u64::from(num_rounds))
            .map(|round| {
                remaining
                    .iter()
                    .enumerate()
                    .map(|(kind, &left)| {
                        let kind = u8::try_from(kind).expect("at most 255 kinds");
                        let stats = UnitGroupStats {
                            times_fired: round + salt,
                            times_was_shot: round * 2 + salt,
                            shield_damage_dealt: 100 * round,
                            hull_damage_dealt: 10 * round + u64::from(kind),
                            shield_damage_taken: 50 * round,
                            hull_damage_taken: 5 * round,
                            num_remaining_units: left,
                        };
                        (UnitKind::new(kind), stats)
                    })
                    .collect()
            })
            .collect();
        CombatantOutcome::new(rounds)
    };

    BattleOutcome {
        seed,
        num_rounds,
        attackers_outcomes: (0..num_attackers as u64).map(&combatant).collect(),
        defenders_outcomes: (0..num_defenders as u64).map(|i| combatant(i + 1000)).collect(),
    }
}
