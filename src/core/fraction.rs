use serde::Serialize;

use super::fields::{self, FieldSpec, FormReader, NumberField};
use super::types::{Metric, Report};

const MAX_DECIMAL_PLACES: u32 = 9;

pub const PERCENT: NumberField = NumberField::new("percent", "Percentage", 0.0)
    .unit("%")
    .range(-1_000_000.0, 1_000_000.0);

pub const FIELDS: [FieldSpec; 1] = [FieldSpec::Number(PERCENT)];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentToFractionInputs {
    pub percent: f64,
    pub decimal_places: u32,
}

impl PercentToFractionInputs {
    pub fn new(percent: f64) -> Self {
        Self {
            percent,
            decimal_places: decimal_places(percent),
        }
    }

    pub fn from_form(form: &mut FormReader<'_>) -> Self {
        let percent = form.number(&PERCENT);
        let typed = form
            .raw(PERCENT.key)
            .and_then(places_in_text)
            .filter(|_| form.substitution_for(PERCENT.key).is_none());
        Self {
            percent,
            decimal_places: typed.unwrap_or_else(|| decimal_places(percent)),
        }
    }
}

// Decimal places as typed, read from the numeric prefix of `raw`.
// Exponent notation gives `None`.
fn places_in_text(raw: &str) -> Option<u32> {
    let cleaned = raw.trim().replace(',', "");
    let (_, consumed) = fields::parse_float_prefix(&cleaned)?;
    let number = &cleaned[..consumed];
    if number.contains(['e', 'E']) || number.ends_with("Infinity") {
        return None;
    }
    let places = number
        .split_once('.')
        .map(|(_, frac)| frac.len() as u32)
        .unwrap_or(0);
    Some(places.min(MAX_DECIMAL_PLACES))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FractionResult {
    pub percent: f64,
    pub decimal: f64,
    pub numerator: i64,
    pub denominator: i64,
    pub fraction: String,
    pub mixed_number: String,
}

pub fn gcd(a: u64, b: u64) -> u64 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn decimal_places(value: f64) -> u32 {
    for places in 0..MAX_DECIMAL_PLACES {
        let scaled = value * 10f64.powi(places as i32);
        if (scaled - scaled.round()).abs() <= 8.0 * f64::EPSILON * scaled.abs().max(1.0) {
            return places;
        }
    }
    MAX_DECIMAL_PLACES
}

pub fn percent_to_fraction(inputs: &PercentToFractionInputs) -> FractionResult {
    let percent = inputs.percent;
    let places = inputs.decimal_places.min(MAX_DECIMAL_PLACES);
    let scale = 10i64.pow(places);

    let raw_numerator = (percent * scale as f64).round() as i64;
    let raw_denominator = 100 * scale;
    let divisor = gcd(raw_numerator.unsigned_abs(), raw_denominator as u64).max(1) as i64;

    let numerator = raw_numerator / divisor;
    let denominator = raw_denominator / divisor;

    FractionResult {
        percent,
        decimal: percent / 100.0,
        numerator,
        denominator,
        fraction: format!("{numerator}/{denominator}"),
        mixed_number: mixed_number(numerator, denominator),
    }
}

fn mixed_number(numerator: i64, denominator: i64) -> String {
    let sign = if numerator < 0 { "-" } else { "" };
    let magnitude = numerator.unsigned_abs();
    let denominator = denominator.unsigned_abs();
    let whole = magnitude / denominator;
    let remainder = magnitude % denominator;

    match (whole, remainder) {
        (0, 0) => "0".to_string(),
        (whole, 0) => format!("{sign}{whole}"),
        (0, remainder) => format!("{sign}{remainder}/{denominator}"),
        (whole, remainder) => format!("{sign}{whole} {remainder}/{denominator}"),
    }
}

impl Report for FractionResult {
    fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::number("numerator", "Numerator", self.numerator as f64, 0),
            Metric::number("denominator", "Denominator", self.denominator as f64, 0),
            Metric::number("decimal", "Decimal", self.decimal, 6)
                .with_display(self.decimal.to_string()),
        ]
    }

    fn classification(&self) -> Option<String> {
        if self.mixed_number == self.fraction {
            Some(self.fraction.clone())
        } else {
            Some(format!("{} ({})", self.fraction, self.mixed_number))
        }
    }
}
