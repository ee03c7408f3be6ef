//! # Battle Core
//!
//! Domain model and wire protocol for driving an external combat engine.
//!
//! This crate contains **only** pure transforms:
//! - No process spawning
//! - No system randomness
//! - No blocking IO
//!
//! The engine itself is a black box. This crate validates what goes into it,
//! encodes that into the engine's text payload, and decodes the per-round
//! statistics it prints back into structured outcomes.
//!
//! ## Crate Structure
//!
//! - [`unit_kind`] - Dense unit kind identifiers
//! - [`attributes`] - Per-kind combat attributes and the attribute table
//! - [`combatant`] - Fleets, sides and roster validation
//! - [`outcome`] - Per-round statistics and battle outcomes
//! - [`protocol`] - Engine input encoder and output decoder
//! - [`error`] - Error taxonomy shared by every crate in the workspace

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod attributes;
pub mod combatant;
pub mod error;
pub mod outcome;
pub mod protocol;
pub mod unit_kind;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::attributes::{validate_attributes, AttributeTable, UnitAttributes};
    pub use crate::combatant::{validate_roster, Combatant, Side, MAX_SIDE_SIZE};
    pub use crate::error::{BattleError, ErrorKind, Result};
    pub use crate::outcome::{BattleOutcome, CombatantOutcome, UnitGroupStats};
    pub use crate::protocol::{decode_output, encode_input, EncodedInput, RosterLayout};
    pub use crate::unit_kind::UnitKind;
}
