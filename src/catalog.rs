//! Static purchase catalogs.
//!
//! Immutable reference data for the premium tiers and credit top-up
//! packages. Prices are in TRY; the engine never reads prices, they are
//! carried for display and receipt logging by the host.

use serde::Serialize;

/// A purchasable subscription tier.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumPackage {
    pub id: &'static str,
    pub name: &'static str,
    pub price: u32,
    pub credits: u32,
    pub months: u32,
}

/// A purchasable credit top-up.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditPackage {
    pub id: &'static str,
    pub credits: u32,
    pub price: u32,
}

pub const PREMIUM_PACKAGES: &[PremiumPackage] = &[
    PremiumPackage {
        id: "monthly",
        name: "Monthly",
        price: 149,
        credits: 150,
        months: 1,
    },
    PremiumPackage {
        id: "quarterly",
        name: "Quarterly",
        price: 399,
        credits: 500,
        months: 3,
    },
    PremiumPackage {
        id: "biannual",
        name: "Biannual",
        price: 750,
        credits: 1000,
        months: 6,
    },
    PremiumPackage {
        id: "yearly",
        name: "Yearly",
        price: 1250,
        credits: 2500,
        months: 12,
    },
];

pub const CREDIT_PACKAGES: &[CreditPackage] = &[
    CreditPackage { id: "credits-10", credits: 10, price: 35 },
    CreditPackage { id: "credits-20", credits: 20, price: 67 },
    CreditPackage { id: "credits-30", credits: 30, price: 82 },
    CreditPackage { id: "credits-40", credits: 40, price: 110 },
    CreditPackage { id: "credits-50", credits: 50, price: 135 },
];

/// Look up a premium package by id.
pub fn premium_package(id: &str) -> Option<&'static PremiumPackage> {
    PREMIUM_PACKAGES.iter().find(|p| p.id == id)
}

/// Look up a credit package by id.
pub fn credit_package(id: &str) -> Option<&'static CreditPackage> {
    CREDIT_PACKAGES.iter().find(|p| p.id == id)
}
