//! # Battle Tools
//!
//! Command-line support for the `battle-sim` binary:
//! - Loading unit tables, scenarios and client config from RON files
//! - JSON reports of single battles and batch simulations
//! - Data file validation

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod load;
pub mod report;
pub mod scenario;
pub mod validate;
