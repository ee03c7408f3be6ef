//! Engine input encoder.
//!
//! Numbers are written with Rust's `Display`, which never localizes: no
//! thousands separators, `.` as decimal point and no exponent notation.

use std::fmt::Write;

use tracing::trace;

use super::{EncodedInput, RosterLayout};
use crate::attributes::AttributeTable;
use crate::combatant::{validate_roster, Combatant, Side};
use crate::error::Result;

/// Encode the attribute table section.
pub fn encode_attributes(table: &AttributeTable) -> String {
    let mut out = String::new();
    // Writing into a String is infallible.
    let _ = writeln!(out, "{}", table.num_kinds());
    out.push('\n');
    for (_, attrs) in table.iter() {
        let _ = writeln!(
            out,
            "{} {} {} {}",
            attrs.weapons(),
            attrs.shield(),
            attrs.armor(),
            attrs.rapid_fire().len()
        );
        for (target, count) in attrs.rapid_fire() {
            let _ = writeln!(out, "{} {count}", target.as_u8());
        }
        out.push('\n');
    }
    out
}

/// Encode the roster section.
pub fn encode_roster(attackers: &[Combatant], defenders: &[Combatant]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", attackers.len(), defenders.len());
    for combatant in attackers.iter().chain(defenders) {
        let _ = writeln!(
            out,
            "{} {} {} {}",
            combatant.weapons_technology(),
            combatant.shielding_technology(),
            combatant.armor_technology(),
            combatant.unit_groups().len()
        );
        for (kind, count) in combatant.unit_groups() {
            let _ = writeln!(out, "{} {count}", kind.as_u8());
        }
    }
    out
}

/// Validate both sides and encode the full engine payload.
///
/// # Errors
///
/// Returns [`BattleError::InvalidRoster`](crate::error::BattleError::InvalidRoster)
/// if either side fails [`validate_roster`].
pub fn encode_input(
    table: &AttributeTable,
    attackers: &[Combatant],
    defenders: &[Combatant],
) -> Result<EncodedInput> {
    validate_roster(table, attackers, Side::Attackers)?;
    validate_roster(table, defenders, Side::Defenders)?;

    let mut payload = encode_attributes(table);
    payload.push('\n');
    payload.push_str(&encode_roster(attackers, defenders));

    let layout = RosterLayout {
        num_kinds: table.num_kinds(),
        num_attackers: attackers.len(),
        num_defenders: defenders.len(),
    };
    trace!(bytes = payload.len(), ?layout, "Encoded engine input");

    Ok(EncodedInput {
        bytes: payload.into_bytes().into(),
        layout,
    })
}
