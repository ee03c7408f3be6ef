//! Combatants (fleets with tech levels) and roster validation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attributes::AttributeTable;
use crate::error::{BattleError, Result};
use crate::unit_kind::UnitKind;

/// Sides hold strictly fewer combatants than this.
pub const MAX_SIDE_SIZE: usize = 256;

/// Which side of an engagement a roster belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The attacking side.
    Attackers,
    /// The defending side.
    Defenders,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Attackers => "attackers",
            Self::Defenders => "defenders",
        })
    }
}

/// One fleet on one side of an engagement.
///
/// Tech levels are percentage-style bonuses consumed by the engine. Unit
/// groups are kept in ascending kind order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CombatantData", into = "CombatantData")]
pub struct Combatant {
    weapons_technology: u8,
    shielding_technology: u8,
    armor_technology: u8,
    unit_groups: BTreeMap<UnitKind, u64>,
}

impl Combatant {
    /// Create a combatant.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidCombatant`] if a tech level is above 255
    /// or a unit kind appears more than once.
    pub fn new(
        weapons_technology: u32,
        shielding_technology: u32,
        armor_technology: u32,
        unit_groups: impl IntoIterator<Item = (UnitKind, u64)>,
    ) -> Result<Self> {
        let mut groups = BTreeMap::new();
        for (kind, count) in unit_groups {
            if groups.insert(kind, count).is_some() {
                return Err(BattleError::InvalidCombatant(format!(
                    "{kind} appears more than once in unit groups"
                )));
            }
        }

        Ok(Self {
            weapons_technology: tech_level("weapons_technology", weapons_technology)?,
            shielding_technology: tech_level("shielding_technology", shielding_technology)?,
            armor_technology: tech_level("armor_technology", armor_technology)?,
            unit_groups: groups,
        })
    }

    /// Weapons technology level.
    pub fn weapons_technology(&self) -> u8 {
        self.weapons_technology
    }

    /// Shielding technology level.
    pub fn shielding_technology(&self) -> u8 {
        self.shielding_technology
    }

    /// Armor technology level.
    pub fn armor_technology(&self) -> u8 {
        self.armor_technology
    }

    /// Unit counts by kind, ascending.
    pub fn unit_groups(&self) -> &BTreeMap<UnitKind, u64> {
        &self.unit_groups
    }

    /// Number of units of `kind` this combatant brings.
    pub fn count(&self, kind: UnitKind) -> u64 {
        self.unit_groups.get(&kind).copied().unwrap_or(0)
    }
}

fn tech_level(label: &str, value: u32) -> Result<u8> {
    u8::try_from(value).map_err(|_| {
        BattleError::InvalidCombatant(format!("{label} must be between 0 and 255, got {value}"))
    })
}

/// Serialized shape of [`Combatant`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "Combatant")]
struct CombatantData {
    #[serde(default)]
    weapons_technology: u32,
    #[serde(default)]
    shielding_technology: u32,
    #[serde(default)]
    armor_technology: u32,
    unit_groups: BTreeMap<UnitKind, u64>,
}

impl TryFrom<CombatantData> for Combatant {
    type Error = BattleError;

    fn try_from(data: CombatantData) -> Result<Self> {
        Self::new(
            data.weapons_technology,
            data.shielding_technology,
            data.armor_technology,
            data.unit_groups,
        )
    }
}

impl From<Combatant> for CombatantData {
    fn from(combatant: Combatant) -> Self {
        Self {
            weapons_technology: u32::from(combatant.weapons_technology),
            shielding_technology: u32::from(combatant.shielding_technology),
            armor_technology: u32::from(combatant.armor_technology),
            unit_groups: combatant.unit_groups,
        }
    }
}

/// Validate one side of an engagement against an attribute table.
///
/// # Errors
///
/// Returns [`BattleError::InvalidRoster`] if the side holds 256 or more
/// combatants, or a combatant references a kind absent from `table`.
pub fn validate_roster(table: &AttributeTable, combatants: &[Combatant], side: Side) -> Result<()> {
    if combatants.len() >= MAX_SIDE_SIZE {
        return Err(BattleError::InvalidRoster(format!(
            "too many {side}: {} (limit {})",
            combatants.len(),
            MAX_SIDE_SIZE - 1
        )));
    }

    for (i, combatant) in combatants.iter().enumerate() {
        if let Some(kind) = combatant.unit_groups.keys().find(|&&kind| !table.contains(kind)) {
            return Err(BattleError::InvalidRoster(format!(
                "no {kind} found in units attributes for {side} at {i}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::UnitAttributes;
    use crate::error::ErrorKind;

    fn table(num_kinds: usize) -> AttributeTable {
        AttributeTable::new(vec![
            UnitAttributes::new(1.0, 1.0, 1.0, []).unwrap();
            num_kinds
        ])
        .unwrap()
    }

    #[test]
    fn test_tech_levels_range_checked() {
        assert!(Combatant::new(255, 0, 255, []).is_ok());

        for (w, s, a) in [(256, 0, 0), (0, 1000, 0), (0, 0, u32::MAX)] {
            let err = Combatant::new(w, s, a, []).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidCombatant);
        }
    }

    #[test]
    fn test_unit_groups_sorted() {
        let combatant = Combatant::new(
            1,
            2,
            3,
            [(UnitKind::new(5), 10), (UnitKind::new(1), u64::MAX)],
        )
        .unwrap();
        let kinds: Vec<_> = combatant.unit_groups().keys().copied().collect();
        assert_eq!(kinds, vec![UnitKind::new(1), UnitKind::new(5)]);
        assert_eq!(combatant.count(UnitKind::new(1)), u64::MAX);
        assert_eq!(combatant.count(UnitKind::new(2)), 0);
    }

    #[test]
    fn test_repeated_kind_rejected() {
        let err = Combatant::new(0, 0, 0, [(UnitKind::new(0), 5), (UnitKind::new(0), 7)])
            .unwrap_err();
        assert_eq!(
            err,
            BattleError::InvalidCombatant(
                "UnitKind(0) appears more than once in unit groups".into()
            )
        );
    }

    #[test]
    fn test_side_size_limit() {
        let table = table(1);
        let fleet = Combatant::new(0, 0, 0, [(UnitKind::new(0), 1)]).unwrap();

        let side = vec![fleet.clone(); MAX_SIDE_SIZE - 1];
        assert!(validate_roster(&table, &side, Side::Attackers).is_ok());

        let side = vec![fleet; MAX_SIDE_SIZE];
        let err = validate_roster(&table, &side, Side::Defenders).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRoster);
        assert!(err.to_string().contains("too many defenders"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let table = table(2);
        let side = vec![
            Combatant::new(0, 0, 0, [(UnitKind::new(1), 1)]).unwrap(),
            Combatant::new(0, 0, 0, [(UnitKind::new(2), 1)]).unwrap(),
        ];
        let err = validate_roster(&table, &side, Side::Attackers).unwrap_err();
        assert_eq!(
            err,
            BattleError::InvalidRoster(
                "no UnitKind(2) found in units attributes for attackers at 1".into()
            )
        );
    }

    #[test]
    fn test_empty_side_is_valid() {
        assert!(validate_roster(&table(1), &[], Side::Defenders).is_ok());
    }

    #[test]
    fn test_ron_combatant_validates() {
        let ok: Combatant =
            ron::from_str("Combatant(weapons_technology: 10, unit_groups: {5: 250000})").unwrap();
        assert_eq!(ok.weapons_technology(), 10);
        assert_eq!(ok.shielding_technology(), 0);

        let bad = ron::from_str::<Combatant>("Combatant(armor_technology: 300, unit_groups: {})");
        assert!(bad.is_err());
    }
}
