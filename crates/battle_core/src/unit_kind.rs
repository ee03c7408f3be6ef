//! Dense unit kind identifiers.
//!
//! A [`UnitKind`] is a positional index into the [`AttributeTable`]: kinds
//! always form the contiguous range `0..N`. The engine reads kind numbers as
//! 8-bit values, so a table holds at most [`UnitKind::MAX_KINDS`] kinds.
//!
//! [`AttributeTable`]: crate::attributes::AttributeTable

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric identifier for a unit kind.
///
/// # Example
///
/// ```
/// use battle_core::unit_kind::UnitKind;
///
/// let kind = UnitKind::new(12);
/// assert_eq!(kind.index(), 12);
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct UnitKind(u8);

impl UnitKind {
    /// Largest number of kinds an attribute table may hold.
    pub const MAX_KINDS: usize = u8::MAX as usize;

    /// Create a new unit kind.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Position of this kind in the attribute table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over every kind of a table with `num_kinds` entries, ascending.
    pub fn all(num_kinds: usize) -> impl Iterator<Item = Self> {
        (0..num_kinds.min(Self::MAX_KINDS)).map(|i| Self(i as u8))
    }
}

impl From<u8> for UnitKind {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitKind({})", self.0)
    }
}
