use serde::Serialize;

use super::error::CalcResult;
use super::fields::{ChoiceField, FieldSpec, FormReader, NumberField};
use super::types::{Metric, Report};

// Down payment share below which private mortgage insurance is charged.
const PMI_EQUITY_THRESHOLD: f64 = 0.20;
// Loan-to-value ratio at which PMI is cancelled automatically.
const PMI_CANCEL_LTV: f64 = 0.78;

pub const HOME_PRICE: NumberField = NumberField::new("homePrice", "Home price", 0.0)
    .unit("$")
    .min(0.0);
pub const DOWN_PAYMENT: NumberField = NumberField::new("downPayment", "Down payment", 0.0).min(0.0);
pub const DOWN_PAYMENT_UNIT: ChoiceField = ChoiceField::new(
    "downPaymentUnit",
    "Down payment unit",
    &["amount", "percent"],
    "amount",
);
pub const RATE: NumberField = NumberField::new("rate", "Interest rate", 0.0)
    .unit("%")
    .range(0.0, 100.0);
pub const TERM_YEARS: NumberField = NumberField::new("termYears", "Loan term", 30.0)
    .unit("years")
    .range(1.0, 50.0);
pub const PROPERTY_TAX: NumberField =
    NumberField::new("propertyTax", "Property tax (annual)", 0.0)
        .unit("$")
        .min(0.0);
pub const INSURANCE: NumberField = NumberField::new("insurance", "Home insurance (annual)", 0.0)
    .unit("$")
    .min(0.0);
pub const HOA: NumberField = NumberField::new("hoa", "HOA dues (monthly)", 0.0)
    .unit("$")
    .min(0.0);
pub const PMI_RATE: NumberField = NumberField::new("pmiRate", "PMI rate (annual)", 0.5)
    .unit("%")
    .range(0.0, 5.0);

pub const FIELDS: [FieldSpec; 9] = [
    FieldSpec::Number(HOME_PRICE),
    FieldSpec::Number(DOWN_PAYMENT),
    FieldSpec::Choice(DOWN_PAYMENT_UNIT),
    FieldSpec::Number(RATE),
    FieldSpec::Number(TERM_YEARS),
    FieldSpec::Number(PROPERTY_TAX),
    FieldSpec::Number(INSURANCE),
    FieldSpec::Number(HOA),
    FieldSpec::Number(PMI_RATE),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MortgageInputs {
    pub home_price: f64,
    pub down_payment: f64,
    pub annual_rate: f64,
    pub term_years: u32,
    pub annual_property_tax: f64,
    pub annual_insurance: f64,
    pub monthly_hoa: f64,
    pub pmi_rate: f64,
}

impl MortgageInputs {
    pub fn from_form(form: &mut FormReader<'_>) -> CalcResult<Self> {
        let home_price = form.number(&HOME_PRICE);
        let down_raw = form.number(&DOWN_PAYMENT);
        let down_payment = match form.choice(&DOWN_PAYMENT_UNIT)? {
            "percent" => home_price * down_raw.min(100.0) / 100.0,
            _ => down_raw,
        };
        Ok(Self {
            home_price,
            down_payment,
            annual_rate: form.number(&RATE) / 100.0,
            term_years: form.number(&TERM_YEARS).round() as u32,
            annual_property_tax: form.number(&PROPERTY_TAX),
            annual_insurance: form.number(&INSURANCE),
            monthly_hoa: form.number(&HOA),
            pmi_rate: form.number(&PMI_RATE) / 100.0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationYear {
    pub year: u32,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub ending_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageResult {
    pub loan_amount: f64,
    pub down_payment: f64,
    pub down_payment_percent: f64,
    pub monthly_principal_interest: f64,
    pub monthly_property_tax: f64,
    pub monthly_insurance: f64,
    pub monthly_hoa: f64,
    pub monthly_pmi: f64,
    pub monthly_piti: f64,
    pub monthly_total: f64,
    pub pmi_months: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    pub schedule: Vec<AmortizationYear>,
}

pub fn monthly_payment(principal: f64, annual_rate: f64, months: u32) -> f64 {
    if principal <= 0.0 || months == 0 {
        return 0.0;
    }
    let i = annual_rate / 12.0;
    if i.abs() < 1e-12 {
        return principal / months as f64;
    }
    principal * i / (1.0 - (1.0 + i).powi(-(months as i32)))
}

pub fn calculate(inputs: &MortgageInputs) -> MortgageResult {
    let home_price = inputs.home_price.max(0.0);
    let down_payment = inputs.down_payment.clamp(0.0, home_price);
    let loan_amount = home_price - down_payment;
    let months = inputs.term_years.max(1) * 12;
    let monthly_rate = inputs.annual_rate.max(0.0) / 12.0;
    let payment = monthly_payment(loan_amount, inputs.annual_rate.max(0.0), months);

    let down_share = if home_price > 0.0 {
        down_payment / home_price
    } else {
        1.0
    };
    let monthly_pmi = if down_share < PMI_EQUITY_THRESHOLD {
        loan_amount * inputs.pmi_rate.max(0.0) / 12.0
    } else {
        0.0
    };

    let mut balance = loan_amount;
    let mut schedule = Vec::with_capacity(inputs.term_years as usize);
    let mut total_interest = 0.0;
    let mut pmi_months = 0;
    let mut year_principal = 0.0;
    let mut year_interest = 0.0;

    for month in 1..=months {
        if monthly_pmi > 0.0 && balance > PMI_CANCEL_LTV * home_price {
            pmi_months += 1;
        }

        let interest = balance * monthly_rate;
        let principal = (payment - interest).min(balance).max(0.0);
        balance -= principal;
        if balance < 1e-6 {
            balance = 0.0;
        }

        total_interest += interest;
        year_principal += principal;
        year_interest += interest;

        if month % 12 == 0 {
            schedule.push(AmortizationYear {
                year: month / 12,
                principal_paid: year_principal,
                interest_paid: year_interest,
                ending_balance: balance,
            });
            year_principal = 0.0;
            year_interest = 0.0;
        }
    }

    let monthly_property_tax = inputs.annual_property_tax.max(0.0) / 12.0;
    let monthly_insurance = inputs.annual_insurance.max(0.0) / 12.0;
    let monthly_hoa = inputs.monthly_hoa.max(0.0);
    let monthly_piti = payment + monthly_property_tax + monthly_insurance;

    MortgageResult {
        loan_amount,
        down_payment,
        down_payment_percent: down_share * 100.0,
        monthly_principal_interest: payment,
        monthly_property_tax,
        monthly_insurance,
        monthly_hoa,
        monthly_pmi,
        monthly_piti,
        monthly_total: monthly_piti + monthly_hoa + monthly_pmi,
        pmi_months,
        total_interest,
        total_paid: loan_amount + total_interest,
        schedule,
    }
}

impl Report for MortgageResult {
    fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::currency(
                "monthlyPrincipalInterest",
                "Principal & interest",
                self.monthly_principal_interest,
            ),
            Metric::currency("monthlyPropertyTax", "Property tax", self.monthly_property_tax),
            Metric::currency("monthlyInsurance", "Insurance", self.monthly_insurance),
            Metric::currency("monthlyPiti", "PITI", self.monthly_piti),
            Metric::currency("monthlyHoa", "HOA", self.monthly_hoa),
            Metric::currency("monthlyPmi", "PMI", self.monthly_pmi),
            Metric::currency("monthlyTotal", "Total monthly payment", self.monthly_total),
            Metric::currency("loanAmount", "Loan amount", self.loan_amount),
            Metric::percent(
                "downPaymentPercent",
                "Down payment",
                self.down_payment_percent,
                1,
            ),
            Metric::currency("totalInterest", "Total interest", self.total_interest),
            Metric::currency("totalPaid", "Total of payments", self.total_paid),
            Metric::number("pmiMonths", "Months with PMI", self.pmi_months as f64, 0),
        ]
    }

    fn classification(&self) -> Option<String> {
        if self.loan_amount <= 0.0 {
            return Some("No loan required".to_string());
        }
        let label = if self.monthly_pmi > 0.0 {
            "Down payment under 20%: PMI applies"
        } else {
            "Down payment of 20% or more: no PMI"
        };
        Some(label.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn sample() -> MortgageInputs {
        MortgageInputs {
            home_price: 400_000.0,
            down_payment: 80_000.0,
            annual_rate: 0.065,
            term_years: 30,
            annual_property_tax: 4_800.0,
            annual_insurance: 1_200.0,
            monthly_hoa: 0.0,
            pmi_rate: 0.005,
        }
    }

    #[test]
    fn standard_thirty_year_payment() {
        let result = calculate(&sample());
        assert!((result.loan_amount - 320_000.0).abs() < 1e-9);
        assert!((result.monthly_principal_interest - 2_022.62).abs() < 0.01);
        assert!((result.monthly_piti - (2_022.62 + 400.0 + 100.0)).abs() < 0.01);
        assert_eq!(result.monthly_pmi, 0.0);
        assert_eq!(result.schedule.len(), 30);
    }

    #[test]
    fn zero_rate_divides_principal_evenly() {
        assert!((monthly_payment(120_000.0, 0.0, 120) - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn small_down_payment_charges_pmi_until_cancellation() {
        let mut inputs = sample();
        inputs.down_payment = 20_000.0;
        let result = calculate(&inputs);
        assert!((result.monthly_pmi - 380_000.0 * 0.005 / 12.0).abs() < 1e-9);
        assert!(result.pmi_months > 0);
        assert!(result.pmi_months < 360);
    }

    #[test]
    fn down_payment_above_price_means_no_loan() {
        let mut inputs = sample();
        inputs.down_payment = 500_000.0;
        let result = calculate(&inputs);
        assert_eq!(result.loan_amount, 0.0);
        assert_eq!(result.monthly_principal_interest, 0.0);
        assert_eq!(result.classification().as_deref(), Some("No loan required"));
    }

    proptest! {
        #[test]
        fn prop_schedule_retires_the_loan(
            price in 50_000.0f64..2_000_000.0,
            down_share in 0.0f64..0.9,
            rate_bp in 0u32..1500,
            term in 5u32..40,
        ) {
            let inputs = MortgageInputs {
                home_price: price,
                down_payment: price * down_share,
                annual_rate: rate_bp as f64 / 10_000.0,
                term_years: term,
                annual_property_tax: 0.0,
                annual_insurance: 0.0,
                monthly_hoa: 0.0,
                pmi_rate: 0.0,
            };
            let result = calculate(&inputs);
            let last = result.schedule.last().expect("schedule has rows");
            prop_assert!(last.ending_balance.abs() < 1e-4);
            let principal: f64 = result.schedule.iter().map(|y| y.principal_paid).sum();
            prop_assert!((principal - result.loan_amount).abs() < 1e-4);
            prop_assert!(result.total_interest >= -1e-9);
        }
    }
}
