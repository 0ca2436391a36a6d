//! CLI command definitions.
//!
//! Defines all commands and arguments using clap derive macros.
//!
//! ## Commands
//!
//! - `status` - Show entitlement status and remaining uses
//! - `request` - Run one gated feature-use request
//! - `premium` - List or activate premium packages
//! - `credits` - List, buy, or grant credit packages
//! - `reset` - Wipe all entitlement state (debug)
//! - `simulate-new-day` - Force a daily counter rollover (debug)

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::ads::RewardOutcome;

/// Orbis - usage metering and premium entitlements
#[derive(Parser, Debug)]
#[command(name = "orbis")]
#[command(about = "Usage metering and premium entitlement engine", long_about = None)]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the entitlement snapshot file
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Simulated rewarded-ad outcome for the `request` command.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliAdOutcome {
    /// Ad watched through, reward earned
    #[default]
    Rewarded,
    /// Ad closed before the reward fired
    Dismissed,
    /// Ad infrastructure failure (engine fails open)
    Failed,
}

impl From<CliAdOutcome> for RewardOutcome {
    fn from(outcome: CliAdOutcome) -> Self {
        match outcome {
            CliAdOutcome::Rewarded => RewardOutcome::Rewarded,
            CliAdOutcome::Dismissed => RewardOutcome::DismissedWithoutReward,
            CliAdOutcome::Failed => RewardOutcome::PresentationFailed,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show entitlement status and remaining uses
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run one gated feature-use request
    Request {
        /// Simulated outcome for an ad-gated request
        #[arg(long, value_enum, default_value_t)]
        ad_outcome: CliAdOutcome,

        /// Decline the ad confirmation prompt
        #[arg(long)]
        decline_prompt: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Premium subscription packages
    Premium {
        #[command(subcommand)]
        command: PremiumCommands,
    },

    /// Credit top-up packages
    Credits {
        #[command(subcommand)]
        command: CreditCommands,
    },

    /// Wipe all entitlement state (debug)
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Force a daily counter rollover (debug)
    SimulateNewDay,
}

#[derive(Subcommand, Debug)]
pub enum PremiumCommands {
    /// List available premium packages
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Activate a premium package
    Activate {
        /// Package id (monthly, quarterly, biannual, yearly)
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CreditCommands {
    /// List available credit packages
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Buy a credit package (premium accounts only)
    Buy {
        /// Package id (credits-10 .. credits-50)
        id: String,
    },

    /// Grant credits directly (server reconciliation / debug)
    Add {
        /// Number of credits to add
        amount: u32,
    },
}
