//! Per-kind combat attributes and the attribute table.
//!
//! The attribute table is game-balance configuration: it is built once,
//! validated once and then shared read-only by every engagement.
//!
//! # Example RON
//!
//! ```ron
//! AttributeTable(
//!     units: [
//!         (name: Some("Light Fighter"), weapons: 50.0, shield: 10.0, armor: 4000.0, rapid_fire: {8: 5}),
//!         (weapons: 80.0, shield: 10.0, armor: 2000.0),
//!     ],
//! )
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};
use crate::unit_kind::UnitKind;

/// Combat attributes of one unit kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UnitAttributesData", into = "UnitAttributesData")]
pub struct UnitAttributes {
    name: Option<String>,
    weapons: f64,
    shield: f64,
    armor: f64,
    rapid_fire: BTreeMap<UnitKind, u32>,
}

impl UnitAttributes {
    /// Create attributes for a unit kind.
    ///
    /// `rapid_fire` maps a target kind to the engine's extra-shot threshold
    /// against that target. Targets are only checked against the table once
    /// the attributes are placed in an [`AttributeTable`].
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidAttributes`] if weapons, shield or armor
    /// are not finite and strictly positive, or a rapid-fire threshold does
    /// not fit in 32 bits, or a rapid-fire target appears more than once.
    pub fn new(
        weapons: f64,
        shield: f64,
        armor: f64,
        rapid_fire: impl IntoIterator<Item = (UnitKind, u64)>,
    ) -> Result<Self> {
        for (label, value) in [("weapons", weapons), ("shield", shield), ("armor", armor)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(BattleError::InvalidAttributes(format!(
                    "{label} must be greater than 0, got {value}"
                )));
            }
        }

        let mut thresholds = BTreeMap::new();
        for (target, count) in rapid_fire {
            let count = u32::try_from(count).map_err(|_| {
                BattleError::InvalidAttributes(format!(
                    "rapid fire against {target} must be between 0 and {}, got {count}",
                    u32::MAX
                ))
            })?;
            if thresholds.insert(target, count).is_some() {
                return Err(BattleError::InvalidAttributes(format!(
                    "rapid fire against {target} is given more than once"
                )));
            }
        }

        Ok(Self {
            name: None,
            weapons,
            shield,
            armor,
            rapid_fire: thresholds,
        })
    }

    /// Attach a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Display name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Damage per shot.
    pub fn weapons(&self) -> f64 {
        self.weapons
    }

    /// Damage absorbed before the hull is hit.
    pub fn shield(&self) -> f64 {
        self.shield
    }

    /// Hull hit points.
    pub fn armor(&self) -> f64 {
        self.armor
    }

    /// Rapid-fire thresholds by target kind, ascending.
    pub fn rapid_fire(&self) -> &BTreeMap<UnitKind, u32> {
        &self.rapid_fire
    }
}

/// Serialized shape of [`UnitAttributes`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UnitAttributesData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    weapons: f64,
    shield: f64,
    armor: f64,
    #[serde(default)]
    rapid_fire: BTreeMap<UnitKind, u64>,
}

impl TryFrom<UnitAttributesData> for UnitAttributes {
    type Error = BattleError;

    fn try_from(data: UnitAttributesData) -> Result<Self> {
        let attrs = Self::new(data.weapons, data.shield, data.armor, data.rapid_fire)?;
        Ok(match data.name {
            Some(name) => attrs.with_name(name),
            None => attrs,
        })
    }
}

impl From<UnitAttributes> for UnitAttributesData {
    fn from(attrs: UnitAttributes) -> Self {
        Self {
            name: attrs.name,
            weapons: attrs.weapons,
            shield: attrs.shield,
            armor: attrs.armor,
            rapid_fire: attrs
                .rapid_fire
                .into_iter()
                .map(|(kind, count)| (kind, u64::from(count)))
                .collect(),
        }
    }
}

/// Validate an attribute table keyed by unit kind.
///
/// The kind domain must be exactly `0..N` with `1 <= N <= 255`, and every
/// rapid-fire target must lie in that same domain.
///
/// # Errors
///
/// Returns [`BattleError::InvalidAttributes`] describing the first violation.
pub fn validate_attributes(table: &BTreeMap<UnitKind, UnitAttributes>) -> Result<()> {
    let num_kinds = table.len();
    check_kind_count(num_kinds)?;

    for (expected, (&kind, attrs)) in UnitKind::all(num_kinds).zip(table) {
        if kind != expected {
            return Err(BattleError::InvalidAttributes(format!(
                "no {expected} found in units attributes"
            )));
        }
        check_rapid_fire_targets(kind, attrs, num_kinds)?;
    }

    Ok(())
}

fn check_kind_count(num_kinds: usize) -> Result<()> {
    if num_kinds == 0 {
        return Err(BattleError::InvalidAttributes(
            "units attributes cannot be empty".to_string(),
        ));
    }
    if num_kinds > UnitKind::MAX_KINDS {
        return Err(BattleError::InvalidAttributes(format!(
            "at most {} unit kinds are supported, got {num_kinds}",
            UnitKind::MAX_KINDS
        )));
    }
    Ok(())
}

fn check_rapid_fire_targets(kind: UnitKind, attrs: &UnitAttributes, num_kinds: usize) -> Result<()> {
    match attrs.rapid_fire.keys().find(|target| target.index() >= num_kinds) {
        Some(target) => Err(BattleError::InvalidAttributes(format!(
            "{target} in rapid fire of {kind} does not exist in units attributes"
        ))),
        None => Ok(()),
    }
}

/// Validated, immutable table of attributes indexed by [`UnitKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AttributeTableData", into = "AttributeTableData")]
pub struct AttributeTable {
    units: Vec<UnitAttributes>,
}

impl AttributeTable {
    /// Build a table from attributes listed in kind order.
    ///
    /// Position `i` in `units` becomes `UnitKind(i)`.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidAttributes`] if the table is empty, too
    /// large, or a rapid-fire target is unknown.
    pub fn new(units: Vec<UnitAttributes>) -> Result<Self> {
        check_kind_count(units.len())?;
        for (kind, attrs) in UnitKind::all(units.len()).zip(&units) {
            check_rapid_fire_targets(kind, attrs, units.len())?;
        }
        Ok(Self { units })
    }

    /// Build a table from attributes keyed by kind.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidAttributes`] if the kinds are not exactly
    /// `0..N`; see [`validate_attributes`].
    pub fn from_map(table: BTreeMap<UnitKind, UnitAttributes>) -> Result<Self> {
        validate_attributes(&table)?;
        Ok(Self {
            units: table.into_values().collect(),
        })
    }

    /// Parse and validate a table from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidAttributes`] if the text does not parse
    /// or the table is invalid.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| BattleError::InvalidAttributes(e.to_string()))
    }

    /// Number of unit kinds.
    pub fn num_kinds(&self) -> usize {
        self.units.len()
    }

    /// Whether `kind` exists in this table.
    pub fn contains(&self, kind: UnitKind) -> bool {
        kind.index() < self.units.len()
    }

    /// Attributes of `kind`, if it exists.
    pub fn get(&self, kind: UnitKind) -> Option<&UnitAttributes> {
        self.units.get(kind.index())
    }

    /// Iterate over `(kind, attributes)` in ascending kind order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitKind, &UnitAttributes)> {
        UnitKind::all(self.units.len()).zip(&self.units)
    }

    /// Display name of `kind`, falling back to its number.
    pub fn display_name(&self, kind: UnitKind) -> String {
        self.get(kind)
            .and_then(UnitAttributes::name)
            .map_or_else(|| kind.to_string(), str::to_string)
    }
}

/// Serialized shape of [`AttributeTable`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "AttributeTable")]
struct AttributeTableData {
    units: Vec<UnitAttributes>,
}

impl TryFrom<AttributeTableData> for AttributeTable {
    type Error = BattleError;

    fn try_from(data: AttributeTableData) -> Result<Self> {
        Self::new(data.units)
    }
}

impl From<AttributeTable> for AttributeTableData {
    fn from(table: AttributeTable) -> Self {
        Self { units: table.units }
    }
}
