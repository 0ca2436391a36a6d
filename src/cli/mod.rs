//! CLI module for Orbis.
//!
//! Hosts the command definitions and output formatting used by the
//! `orbis` binary. The binary is a thin host around the entitlement
//! engine: it wires a file-backed store, a simulated ad presenter, and
//! the system clock, then dispatches one engine operation per invocation.
//!
//! ## Module Structure
//!
//! - `commands`: CLI command definitions using clap
//! - `output`: human/JSON output formatting

pub mod commands;
pub mod output;

pub use commands::{Cli, CliAdOutcome, Commands, CreditCommands, PremiumCommands};
