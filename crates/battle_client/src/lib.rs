//! Client for an external, stochastic combat engine.
//!
//! The engine runs as a child process, one process per engagement:
//!
//! 1. The rosters are validated and encoded once ([`battle_core::protocol`])
//! 2. The engine is spawned with a seed, fed the payload on stdin and given a
//!    time limit
//! 3. Its stdout is decoded into a [`BattleOutcome`]
//!
//! [`BattleEngine::simulate`] fans this out over many seeds on a bounded
//! worker pool and returns outcomes in run order.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use battle_client::BattleEngine;
//! use battle_core::prelude::*;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let table = AttributeTable::from_ron_str(&std::fs::read_to_string("data/ogame_units.ron")?)?;
//! let engine = BattleEngine::new("./build/BattleEngine", table)?;
//!
//! let attackers = vec![Combatant::new(10, 10, 10, [(UnitKind::new(5), 25_000)])?];
//! let defenders = vec![Combatant::new(10, 10, 10, [(UnitKind::new(12), 250)])?];
//!
//! let outcomes = engine.simulate(&attackers, &defenders, 0, 100, Some(Duration::from_secs(30)))?;
//! println!("first run lasted {} rounds", outcomes[0].num_rounds);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod batch;
pub mod client;
pub mod config;
pub mod engine;
pub mod process;
pub mod seed;
pub mod summary;

pub use battle_core::outcome::BattleOutcome;
pub use client::BattleEngine;
pub use config::ClientConfig;
pub use engine::{CancelToken, Engine, EngineOutput};
pub use process::ProcessEngine;
pub use seed::{RandomSeeds, SeedSource};
pub use summary::{BatchSummary, CombatantSummary, RemainingUnitsStats};
