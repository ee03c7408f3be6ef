//! Engine output decoder.

use tracing::trace;

use super::RosterLayout;
use crate::error::{BattleError, Result};
use crate::outcome::{BattleOutcome, CombatantOutcome, RoundStats, UnitGroupStats};
use crate::unit_kind::UnitKind;

/// Decode engine stdout into a [`BattleOutcome`].
///
/// `seed` is recorded in the outcome as-is.
///
/// # Errors
///
/// Returns [`BattleError::MalformedOutput`] if the output is not a stream of
/// non-negative integers, its length does not match `layout`, or a unit
/// group grows between rounds, and when `layout` names more than
/// [`UnitKind::MAX_KINDS`] kinds. Nothing is returned on failure.
pub fn decode_output(output: &[u8], layout: &RosterLayout, seed: u32) -> Result<BattleOutcome> {
    if layout.num_kinds > UnitKind::MAX_KINDS {
        return Err(BattleError::MalformedOutput(format!(
            "layout has {} unit kinds, at most {} are addressable",
            layout.num_kinds,
            UnitKind::MAX_KINDS
        )));
    }

    let text = std::str::from_utf8(output)
        .map_err(|e| BattleError::MalformedOutput(format!("output is not text: {e}")))?;

    let values = text
        .split_ascii_whitespace()
        .enumerate()
        .map(|(i, token)| {
            token.parse::<u64>().map_err(|_| {
                BattleError::MalformedOutput(format!("token {i} is not an integer: {token:?}"))
            })
        })
        .collect::<Result<Vec<u64>>>()?;

    let Some((&num_rounds, data)) = values.split_first() else {
        return Err(BattleError::MalformedOutput("missing round count".to_string()));
    };

    let num_rounds_u32 = u32::try_from(num_rounds)
        .map_err(|_| BattleError::MalformedOutput(format!("round count {num_rounds} is too large")))?;
    let expected = layout.expected_tokens(num_rounds).ok_or_else(|| {
        BattleError::MalformedOutput(format!("round count {num_rounds} is too large"))
    })?;
    if values.len() != expected {
        return Err(BattleError::MalformedOutput(format!(
            "expected {expected} integers for {num_rounds} rounds, got {}",
            values.len()
        )));
    }

    trace!(num_rounds, tokens = values.len(), "Decoding engine output");

    let rounds = num_rounds_u32 as usize;
    let outcome_size = rounds * layout.num_kinds * UnitGroupStats::FIELD_COUNT;
    let mut outcomes = Vec::with_capacity(layout.num_combatants());

    for (index, chunk) in data.chunks(outcome_size.max(1)).enumerate() {
        let outcome = parse_combatant(chunk, rounds, layout.num_kinds);
        outcome.check_remaining_units().map_err(|e| match e {
            BattleError::MalformedOutput(msg) => {
                BattleError::MalformedOutput(format!("combatant {index}: {msg}"))
            }
            other => other,
        })?;
        outcomes.push(outcome);
    }

    // Zero rounds leave `data` empty, so every combatant gets an empty outcome.
    outcomes.resize_with(layout.num_combatants(), CombatantOutcome::default);
    let defenders_outcomes = outcomes.split_off(layout.num_attackers);

    Ok(BattleOutcome {
        seed,
        num_rounds: num_rounds_u32,
        attackers_outcomes: outcomes,
        defenders_outcomes,
    })
}

fn parse_combatant(data: &[u64], num_rounds: usize, num_kinds: usize) -> CombatantOutcome {
    let mut groups = data.chunks_exact(UnitGroupStats::FIELD_COUNT);
    let rounds = (0..num_rounds)
        .map(|_| {
            UnitKind::all(num_kinds)
                .zip(groups.by_ref())
                .map(|(kind, fields)| {
                    let mut group = [0; UnitGroupStats::FIELD_COUNT];
                    group.copy_from_slice(fields);
                    (kind, UnitGroupStats::from_fields(group))
                })
                .collect::<RoundStats>()
        })
        .collect();
    CombatantOutcome::new(rounds)
}
