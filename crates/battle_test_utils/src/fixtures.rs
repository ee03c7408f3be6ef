//! Test fixtures and helpers.
//!
//! Pre-built attribute tables and fleets for consistent testing.

use battle_core::attributes::{AttributeTable, UnitAttributes};
use battle_core::combatant::Combatant;
use battle_core::unit_kind::UnitKind;

/// The bundled OGame unit table, as RON text.
pub const OGAME_UNITS_RON: &str = include_str!("../../../data/ogame_units.ron");

/// Small Cargo.
pub const SMALL_CARGO: UnitKind = UnitKind::new(0);
/// Light Fighter.
pub const LIGHT_FIGHTER: UnitKind = UnitKind::new(2);
/// Heavy Fighter.
pub const HEAVY_FIGHTER: UnitKind = UnitKind::new(3);
/// Cruiser.
pub const CRUISER: UnitKind = UnitKind::new(4);
/// Battleship.
pub const BATTLESHIP: UnitKind = UnitKind::new(5);
/// Espionage Probe.
pub const ESPIONAGE_PROBE: UnitKind = UnitKind::new(8);
/// Death Star.
pub const DEATH_STAR: UnitKind = UnitKind::new(12);
/// Rocket Launcher.
pub const ROCKET_LAUNCHER: UnitKind = UnitKind::new(14);

/// Parse the bundled OGame unit table.
///
/// # Panics
///
/// Panics if the bundled data no longer parses.
#[must_use]
pub fn ogame_units() -> AttributeTable {
    AttributeTable::from_ron_str(OGAME_UNITS_RON).expect("bundled unit table should parse")
}

/// A table of `num_kinds` identical kinds without rapid fire.
///
/// # Panics
///
/// Panics if `num_kinds` is 0 or above 255.
#[must_use]
pub fn uniform_table(num_kinds: usize) -> AttributeTable {
    let attrs = UnitAttributes::new(10.0, 5.0, 100.0, []).expect("valid attributes");
    AttributeTable::new(vec![attrs; num_kinds]).expect("valid table")
}

/// Two kinds where kind 0 has rapid fire 5 against kind 1.
///
/// # Panics
///
/// Never with the values used here.
#[must_use]
pub fn two_kind_table() -> AttributeTable {
    AttributeTable::new(vec![
        UnitAttributes::new(50.0, 10.0, 4000.0, [(UnitKind::new(1), 5)])
            .expect("valid attributes")
            .with_name("Gunship"),
        UnitAttributes::new(0.01, 0.5, 1000.0, [])
            .expect("valid attributes")
            .with_name("Drone"),
    ])
    .expect("valid table")
}

/// A combatant with no tech bonuses.
///
/// # Panics
///
/// Panics if a kind appears more than once in `groups`.
#[must_use]
pub fn fleet(groups: &[(UnitKind, u64)]) -> Combatant {
    fleet_with_tech(0, groups)
}

/// A combatant with every tech level at `tech`.
///
/// # Panics
///
/// Panics if `tech` is above 255 or a kind appears more than once.
#[must_use]
pub fn fleet_with_tech(tech: u32, groups: &[(UnitKind, u64)]) -> Combatant {
    Combatant::new(tech, tech, tech, groups.iter().copied()).expect("valid combatant")
}

/// `n` copies of the same single-group combatant.
#[must_use]
pub fn side(n: usize, kind: UnitKind, count: u64) -> Vec<Combatant> {
    vec![fleet(&[(kind, count)]); n]
}
