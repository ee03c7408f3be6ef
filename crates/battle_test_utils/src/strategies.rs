//! Proptest strategies for engine inputs and outputs.

use std::collections::BTreeMap;

use battle_core::attributes::{AttributeTable, UnitAttributes};
use battle_core::combatant::Combatant;
use battle_core::outcome::{CombatantOutcome, RoundStats, UnitGroupStats};
use battle_core::unit_kind::UnitKind;
use proptest::prelude::*;

/// A strictly positive, finite attribute value.
pub fn arb_stat() -> impl Strategy<Value = f64> {
    prop_oneof![
        (1u32..100_000).prop_map(f64::from),
        (1u32..1000).prop_map(|n| f64::from(n) / 1000.0),
    ]
}

/// Attributes whose rapid-fire targets lie in `0..num_kinds`.
pub fn arb_unit_attributes(num_kinds: usize) -> impl Strategy<Value = UnitAttributes> {
    let max_kind = u8::try_from(num_kinds.saturating_sub(1)).unwrap_or(u8::MAX);
    (
        arb_stat(),
        arb_stat(),
        arb_stat(),
        proptest::collection::vec((0..=max_kind, 2u64..500), 0..4),
    )
        .prop_map(|(weapons, shield, armor, rapid_fire)| {
            UnitAttributes::new(
                weapons,
                shield,
                armor,
                // Keyed by target so each target appears once.
                rapid_fire
                    .into_iter()
                    .map(|(k, n)| (UnitKind::new(k), n))
                    .collect::<BTreeMap<_, _>>(),
            )
            .expect("generated attributes are valid")
        })
}

/// A valid table of 1 to `max_kinds` kinds.
pub fn arb_attribute_table(max_kinds: usize) -> impl Strategy<Value = AttributeTable> {
    (1..=max_kinds.max(1)).prop_flat_map(|num_kinds| {
        proptest::collection::vec(arb_unit_attributes(num_kinds), num_kinds)
            .prop_map(|units| AttributeTable::new(units).expect("generated table is valid"))
    })
}

/// A combatant using kinds in `0..num_kinds`.
pub fn arb_combatant(num_kinds: usize) -> impl Strategy<Value = Combatant> {
    let max_kind = u8::try_from(num_kinds.saturating_sub(1)).unwrap_or(u8::MAX);
    (
        0u32..=255,
        0u32..=255,
        0u32..=255,
        proptest::collection::vec((0..=max_kind, 1u64..1_000_000), 0..4),
    )
        .prop_map(|(w, s, a, groups)| {
            let groups: BTreeMap<_, _> =
                groups.into_iter().map(|(k, n)| (UnitKind::new(k), n)).collect();
            Combatant::new(w, s, a, groups).expect("generated combatant is valid")
        })
}

/// One side of up to `max_size` combatants.
pub fn arb_side(num_kinds: usize, max_size: usize) -> impl Strategy<Value = Vec<Combatant>> {
    proptest::collection::vec(arb_combatant(num_kinds), 0..=max_size)
}

/// Per-round statistics of one combatant whose remaining units never grow.
pub fn arb_combatant_outcome(
    num_kinds: usize,
    num_rounds: usize,
) -> impl Strategy<Value = CombatantOutcome> {
    let kind_rounds = proptest::collection::vec(
        (
            proptest::array::uniform6(0u64..1_000_000),
            proptest::collection::vec(0u64..10_000, num_rounds),
        ),
        num_kinds,
    );
    kind_rounds.prop_map(move |kinds| {
        let mut rounds = vec![RoundStats::new(); num_rounds];
        for (kind, (counters, mut remaining)) in UnitKind::all(num_kinds).zip(kinds) {
            remaining.sort_unstable_by(|a, b| b.cmp(a));
            for (round, left) in rounds.iter_mut().zip(remaining) {
                let [a, b, c, d, e, f] = counters;
                round.insert(kind, UnitGroupStats::from_fields([a, b, c, d, e, f, left]));
            }
        }
        CombatantOutcome::new(rounds)
    })
}
