//! Orbis CLI - entitlement engine host
//!
//! A command-line host for the entitlement engine:
//! - Status display (human or JSON)
//! - Gated feature-use requests with simulated ad outcomes
//! - Premium and credit purchase flows
//! - Debug helpers (reset, forced day rollover)

use std::io::{stdin, stdout, Write};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orbis_entitlement::cli::{output, Cli, Commands, CreditCommands, PremiumCommands};
use orbis_entitlement::{
    EntitlementEngine, JsonFileStore, LogSink, SimulatedAdPresenter, SystemClock,
    CREDIT_PACKAGES, PREMIUM_PACKAGES,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Quiet by default - only show errors unless explicitly verbose
    let filter = if cli.verbose { "debug" } else { "error" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let store = match &cli.store {
        Some(path) => JsonFileStore::new(path.clone()),
        None => JsonFileStore::default_location(),
    };

    // The CLI host simulates ad presentation; a mobile shell would wire
    // the real SDK behind the same trait.
    let presenter = match &cli.command {
        Commands::Request {
            ad_outcome,
            decline_prompt,
            ..
        } => {
            let presenter = if *decline_prompt {
                SimulatedAdPresenter::declining()
            } else {
                SimulatedAdPresenter::always_rewarded()
            };
            presenter.push_outcome((*ad_outcome).into());
            Arc::new(presenter)
        }
        _ => Arc::new(SimulatedAdPresenter::always_rewarded()),
    };

    let mut engine = EntitlementEngine::initialize(
        Box::new(store),
        presenter,
        Box::new(SystemClock),
        Arc::new(LogSink),
    )
    .await;

    match cli.command {
        Commands::Status { json } => {
            let summary = engine.status_summary();
            if json {
                output::print_status_json(&summary);
            } else {
                output::print_status(&summary);
            }
        }

        Commands::Request { json, .. } => {
            let outcome = engine.request_feature_use().await;
            let remaining = engine.remaining_today();
            if json {
                output::print_outcome_json(&outcome, remaining);
            } else {
                output::print_outcome(&outcome, remaining);
            }
            if !outcome.allowed() {
                std::process::exit(1);
            }
        }

        Commands::Premium { command } => match command {
            PremiumCommands::List { json } => {
                output::print_premium_packages(PREMIUM_PACKAGES, json);
            }
            PremiumCommands::Activate { id } => {
                engine.activate_premium(&id)?;
                println!("Premium activated: {}", id);
                output::print_status(&engine.status_summary());
            }
        },

        Commands::Credits { command } => match command {
            CreditCommands::List { json } => {
                output::print_credit_packages(CREDIT_PACKAGES, json);
            }
            CreditCommands::Buy { id } => {
                engine.purchase_credit_package(&id)?;
                println!("Purchased {}. Credits: {}", id, engine.status_summary().credits);
            }
            CreditCommands::Add { amount } => {
                engine.add_credits(amount);
                println!("Added {} credits. Total: {}", amount, engine.status_summary().credits);
            }
        },

        Commands::Reset { yes } => {
            if yes || confirm_prompt("Reset all entitlement state?")? {
                engine.reset_all();
                println!("Entitlement state reset.");
            } else {
                println!("Aborted.");
            }
        }

        Commands::SimulateNewDay => {
            engine.simulate_new_day();
            println!("Daily counters reset.");
            output::print_status(&engine.status_summary());
        }
    }

    Ok(())
}

fn confirm_prompt(question: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", question);
    stdout().flush()?;
    let mut answer = String::new();
    stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
