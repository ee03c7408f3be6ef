//! Text protocol spoken by the external combat engine.
//!
//! The engine is invoked as `engine <seed>` and reads one payload on stdin:
//!
//! ```text
//! N                              number of unit kinds
//!                                (blank)
//! weapons shield armor R         one block per kind, ascending
//! target count                   R rapid-fire lines
//!                                (blank)
//!                                (blank, separates the sections)
//! A D                            number of attackers and defenders
//! weapons shielding armor G      one block per combatant, attackers first
//! kind count                     G unit group lines
//! ```
//!
//! On success it prints a round count `R` followed by, for every combatant in
//! the same order, `R x N` groups of seven integers (see
//! [`UnitGroupStats`](crate::outcome::UnitGroupStats)), round-major then
//! kind-ascending. The output carries no other lengths, so decoding needs the
//! [`RosterLayout`] the input was encoded with.

mod decode;
mod encode;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use decode::decode_output;
pub use encode::{encode_attributes, encode_input, encode_roster};

/// Sizes needed to interpret engine output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RosterLayout {
    /// Number of unit kinds in the attribute table.
    pub num_kinds: usize,
    /// Number of attacking combatants.
    pub num_attackers: usize,
    /// Number of defending combatants.
    pub num_defenders: usize,
}

impl RosterLayout {
    /// Attackers plus defenders.
    pub fn num_combatants(&self) -> usize {
        self.num_attackers + self.num_defenders
    }

    /// Number of integers the engine must print for `num_rounds` rounds,
    /// including the leading round count. `None` on overflow.
    pub fn expected_tokens(&self, num_rounds: u64) -> Option<usize> {
        let rounds = usize::try_from(num_rounds).ok()?;
        self.num_combatants()
            .checked_mul(rounds)?
            .checked_mul(self.num_kinds)?
            .checked_mul(crate::outcome::UnitGroupStats::FIELD_COUNT)?
            .checked_add(1)
    }
}

/// Immutable, pre-encoded engine input shared by every run of a batch.
///
/// Cloning is cheap; only the seed differs between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedInput {
    bytes: Arc<[u8]>,
    layout: RosterLayout,
}

impl EncodedInput {
    /// Payload to write to the engine's stdin.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Layout the payload was encoded with.
    pub fn layout(&self) -> RosterLayout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_tokens() {
        let layout = RosterLayout {
            num_kinds: 22,
            num_attackers: 2,
            num_defenders: 1,
        };
        assert_eq!(layout.expected_tokens(0), Some(1));
        assert_eq!(layout.expected_tokens(6), Some(1 + 3 * 6 * 22 * 7));
        assert_eq!(layout.expected_tokens(u64::MAX), None);
    }
}
