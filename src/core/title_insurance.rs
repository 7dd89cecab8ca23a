use serde::Serialize;

use super::fields::{FieldSpec, FormReader, NumberField};
use super::format;
use super::tiers::{self, Tier};
use super::types::{Metric, Report};

const MINIMUM_PREMIUM: f64 = 100.0;
const SIMULTANEOUS_LENDER_FEE: f64 = 25.0;

// Owner's policy rate in dollars per $1,000 of coverage.
const RATE_TIERS: [Tier<f64>; 4] = [
    Tier::new(0.0, 100_000.0, 5.75),
    Tier::new(100_000.0, 1_000_000.0, 5.00),
    Tier::new(1_000_000.0, 5_000_000.0, 2.50),
    Tier::new(5_000_000.0, f64::MAX, 2.25),
];

pub const PURCHASE_PRICE: NumberField = NumberField::new("purchasePrice", "Purchase price", 0.0)
    .unit("$")
    .min(0.0);
pub const LOAN_AMOUNT: NumberField = NumberField::new("loanAmount", "Loan amount", 0.0)
    .unit("$")
    .min(0.0);

pub const FIELDS: [FieldSpec; 2] = [
    FieldSpec::Number(PURCHASE_PRICE),
    FieldSpec::Number(LOAN_AMOUNT),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TitleInsuranceInputs {
    pub purchase_price: f64,
    pub loan_amount: f64,
}

impl TitleInsuranceInputs {
    pub fn from_form(form: &mut FormReader<'_>) -> Self {
        Self {
            purchase_price: form.number(&PURCHASE_PRICE),
            loan_amount: form.number(&LOAN_AMOUNT),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleInsuranceResult {
    pub owners_premium: f64,
    pub lenders_premium: f64,
    pub total_premium: f64,
    pub top_tier_rate: f64,
    pub tier_min: f64,
    pub tier_max: f64,
}

pub fn calculate(inputs: &TitleInsuranceInputs) -> TitleInsuranceResult {
    let price = inputs.purchase_price.max(0.0);
    let owners_premium = if price > 0.0 {
        tiers::progressive(&RATE_TIERS, price, |per_thousand| per_thousand / 1000.0)
            .max(MINIMUM_PREMIUM)
    } else {
        0.0
    };
    let lenders_premium = if inputs.loan_amount > 0.0 {
        SIMULTANEOUS_LENDER_FEE
    } else {
        0.0
    };

    let tier = tiers::lookup(&RATE_TIERS, price).unwrap_or(&RATE_TIERS[0]);

    TitleInsuranceResult {
        owners_premium,
        lenders_premium,
        total_premium: owners_premium + lenders_premium,
        top_tier_rate: tier.value,
        tier_min: tier.min,
        tier_max: tier.max,
    }
}

impl Report for TitleInsuranceResult {
    fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::currency("ownersPremium", "Owner's policy", self.owners_premium),
            Metric::currency("lendersPremium", "Lender's policy", self.lenders_premium),
            Metric::currency("totalPremium", "Total title insurance", self.total_premium),
            Metric::currency("topTierRate", "Rate per $1,000", self.top_tier_rate),
        ]
    }

    fn classification(&self) -> Option<String> {
        let range = if self.tier_max >= f64::MAX {
            format!("over {}", format::currency(self.tier_min))
        } else {
            format!(
                "{} to {}",
                format::currency(self.tier_min),
                format::currency(self.tier_max)
            )
        };
        Some(format!(
            "{range} tier at {} per $1,000",
            format::currency(self.top_tier_rate)
        ))
    }
}
