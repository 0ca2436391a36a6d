//! Output formatting for the CLI.

use crate::catalog::{CreditPackage, PremiumPackage};
use crate::engine::{DenialReason, GrantKind, UsageOutcome};
use crate::state::StatusSummary;

/// Render the status summary for humans.
pub fn print_status(summary: &StatusSummary) {
    if summary.is_premium {
        println!("Tier:       premium");
        println!("Credits:    {}", summary.credits);
        if let Some(id) = &summary.premium_package_id {
            println!("Package:    {}", id);
        }
        if let Some(expiry) = summary.premium_expiry {
            println!("Expires:    {}", expiry.format("%Y-%m-%d"));
        }
    } else {
        println!("Tier:       free{}", if summary.is_first_day { " (install day)" } else { "" });
        println!("Remaining:  {} today", summary.remaining);
        println!("Next use:   {}", if summary.needs_ad { "requires an ad" } else { "ad-free" });
    }
    println!("Used today: {}", summary.today_usage);
    println!("Ads today:  {}", summary.today_ads_watched);
    println!("Lifetime:   {}", summary.total_analyses);
}

/// Render the status summary as JSON.
pub fn print_status_json(summary: &StatusSummary) {
    match serde_json::to_string_pretty(summary) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize status: {}", e),
    }
}

/// Render a feature-use outcome for humans.
pub fn print_outcome(outcome: &UsageOutcome, remaining: u32) {
    match outcome {
        UsageOutcome::Granted(kind) => {
            let how = match kind {
                GrantKind::FreeTrial => "install-day free use",
                GrantKind::AdRewarded => "rewarded ad watched",
                GrantKind::AdFailOpen => "ad unavailable, granted anyway",
                GrantKind::PremiumCredit => "premium credit",
            };
            println!("Granted ({}). Remaining today: {}", how, remaining);
        }
        UsageOutcome::Denied(reason) => {
            let why = match reason {
                DenialReason::LimitReached => "limit reached",
                DenialReason::AdDismissed => "ad dismissed",
            };
            println!("Denied ({})", why);
        }
    }
}

/// Render a feature-use outcome as JSON.
pub fn print_outcome_json(outcome: &UsageOutcome, remaining: u32) {
    let (allowed, reason) = match outcome {
        UsageOutcome::Granted(_) => (true, None),
        UsageOutcome::Denied(DenialReason::LimitReached) => (false, Some("limit_reached")),
        UsageOutcome::Denied(DenialReason::AdDismissed) => (false, Some("ad_dismissed")),
    };
    let value = serde_json::json!({
        "allowed": allowed,
        "reason": reason,
        "remaining": remaining,
    });
    println!("{}", value);
}

/// Render the premium catalog.
pub fn print_premium_packages(packages: &[PremiumPackage], json: bool) {
    if json {
        match serde_json::to_string_pretty(packages) {
            Ok(out) => println!("{}", out),
            Err(e) => eprintln!("Failed to serialize packages: {}", e),
        }
        return;
    }
    for pkg in packages {
        println!(
            "{:<10} {:>5} TRY  {:>5} credits  {:>2} months",
            pkg.id, pkg.price, pkg.credits, pkg.months
        );
    }
}

/// Render the credit catalog.
pub fn print_credit_packages(packages: &[CreditPackage], json: bool) {
    if json {
        match serde_json::to_string_pretty(packages) {
            Ok(out) => println!("{}", out),
            Err(e) => eprintln!("Failed to serialize packages: {}", e),
        }
        return;
    }
    for pkg in packages {
        println!("{:<12} {:>3} credits  {:>4} TRY", pkg.id, pkg.credits, pkg.price);
    }
}
