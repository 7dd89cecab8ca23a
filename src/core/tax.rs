use serde::Serialize;

use super::error::CalcResult;
use super::fields::{ChoiceField, FieldSpec, FormReader, NumberField};
use super::tiers::{self, Tier};
use super::types::{Metric, Report};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilingStatus {
    Single,
    MarriedJoint,
    HeadOfHousehold,
}

impl FilingStatus {
    fn from_option(option: &str) -> Self {
        match option {
            "married-joint" => FilingStatus::MarriedJoint,
            "head-of-household" => FilingStatus::HeadOfHousehold,
            _ => FilingStatus::Single,
        }
    }

    pub fn brackets(self) -> &'static [Tier<f64>] {
        match self {
            FilingStatus::Single => &SINGLE_2024,
            FilingStatus::MarriedJoint => &MARRIED_JOINT_2024,
            FilingStatus::HeadOfHousehold => &HEAD_OF_HOUSEHOLD_2024,
        }
    }

    pub fn standard_deduction(self) -> f64 {
        match self {
            FilingStatus::Single => 14_600.0,
            FilingStatus::MarriedJoint => 29_200.0,
            FilingStatus::HeadOfHousehold => 21_900.0,
        }
    }
}

// 2024 US federal ordinary income brackets, rates as fractions.
const SINGLE_2024: [Tier<f64>; 7] = [
    Tier::new(0.0, 11_600.0, 0.10),
    Tier::new(11_600.0, 47_150.0, 0.12),
    Tier::new(47_150.0, 100_525.0, 0.22),
    Tier::new(100_525.0, 191_950.0, 0.24),
    Tier::new(191_950.0, 243_725.0, 0.32),
    Tier::new(243_725.0, 609_350.0, 0.35),
    Tier::new(609_350.0, f64::MAX, 0.37),
];

const MARRIED_JOINT_2024: [Tier<f64>; 7] = [
    Tier::new(0.0, 23_200.0, 0.10),
    Tier::new(23_200.0, 94_300.0, 0.12),
    Tier::new(94_300.0, 201_050.0, 0.22),
    Tier::new(201_050.0, 383_900.0, 0.24),
    Tier::new(383_900.0, 487_450.0, 0.32),
    Tier::new(487_450.0, 731_200.0, 0.35),
    Tier::new(731_200.0, f64::MAX, 0.37),
];

const HEAD_OF_HOUSEHOLD_2024: [Tier<f64>; 7] = [
    Tier::new(0.0, 16_550.0, 0.10),
    Tier::new(16_550.0, 63_100.0, 0.12),
    Tier::new(63_100.0, 100_500.0, 0.22),
    Tier::new(100_500.0, 191_950.0, 0.24),
    Tier::new(191_950.0, 243_700.0, 0.32),
    Tier::new(243_700.0, 609_350.0, 0.35),
    Tier::new(609_350.0, f64::MAX, 0.37),
];

pub const INCOME: NumberField = NumberField::new("income", "Gross income", 0.0)
    .unit("$")
    .min(0.0);
pub const FILING_STATUS: ChoiceField = ChoiceField::new(
    "filingStatus",
    "Filing status",
    &["single", "married-joint", "head-of-household"],
    "single",
);
pub const DEDUCTIONS: NumberField =
    NumberField::new("deductions", "Deductions (0 = standard deduction)", 0.0)
        .unit("$")
        .min(0.0);

pub const FIELDS: [FieldSpec; 3] = [
    FieldSpec::Number(INCOME),
    FieldSpec::Choice(FILING_STATUS),
    FieldSpec::Number(DEDUCTIONS),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncomeTaxInputs {
    pub gross_income: f64,
    pub filing_status: FilingStatus,
    pub deductions: f64,
}

impl IncomeTaxInputs {
    pub fn from_form(form: &mut FormReader<'_>) -> CalcResult<Self> {
        Ok(Self {
            gross_income: form.number(&INCOME),
            filing_status: FilingStatus::from_option(form.choice(&FILING_STATUS)?),
            deductions: form.number(&DEDUCTIONS),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketSlice {
    pub rate: f64,
    pub lower: f64,
    pub taxed_amount: f64,
    pub tax: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeTaxResult {
    pub filing_status: FilingStatus,
    pub gross_income: f64,
    pub deduction: f64,
    pub taxable_income: f64,
    pub tax: f64,
    pub effective_rate: f64,
    pub marginal_rate: f64,
    pub after_tax_income: f64,
    pub brackets: Vec<BracketSlice>,
}

pub fn calculate(inputs: &IncomeTaxInputs) -> IncomeTaxResult {
    let table = inputs.filing_status.brackets();
    let gross_income = inputs.gross_income.max(0.0);
    let deduction = if inputs.deductions > 0.0 {
        inputs.deductions
    } else {
        inputs.filing_status.standard_deduction()
    };
    let taxable_income = (gross_income - deduction).max(0.0);

    let brackets = tiers::portions(table, taxable_income)
        .into_iter()
        .map(|(tier, amount)| BracketSlice {
            rate: tier.value * 100.0,
            lower: tier.min,
            taxed_amount: amount,
            tax: amount * tier.value,
        })
        .collect::<Vec<_>>();
    let tax = tiers::progressive(table, taxable_income, |rate| *rate);

    let marginal_rate = if taxable_income > 0.0 {
        tiers::lookup(table, taxable_income)
            .map(|tier| tier.value * 100.0)
            .unwrap_or(0.0)
    } else {
        0.0
    };
    let effective_rate = if gross_income > 0.0 {
        tax / gross_income * 100.0
    } else {
        0.0
    };

    IncomeTaxResult {
        filing_status: inputs.filing_status,
        gross_income,
        deduction,
        taxable_income,
        tax,
        effective_rate,
        marginal_rate,
        after_tax_income: gross_income - tax,
        brackets,
    }
}

impl Report for IncomeTaxResult {
    fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::currency("taxableIncome", "Taxable income", self.taxable_income),
            Metric::currency("deduction", "Deduction", self.deduction),
            Metric::currency("tax", "Federal income tax", self.tax),
            Metric::percent("effectiveRate", "Effective rate", self.effective_rate, 2),
            Metric::percent("marginalRate", "Marginal rate", self.marginal_rate, 0),
            Metric::currency("afterTaxIncome", "After-tax income", self.after_tax_income),
        ]
    }

    fn classification(&self) -> Option<String> {
        if self.taxable_income <= 0.0 {
            return Some("No taxable income".to_string());
        }
        Some(format!("{}% bracket", self.marginal_rate.round()))
    }
}
