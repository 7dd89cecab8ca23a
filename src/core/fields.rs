use std::collections::BTreeMap;

use serde::Serialize;

use super::error::{CalcError, CalcResult};

pub type FormValues = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberField {
    pub key: &'static str,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    pub default: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl NumberField {
    pub const fn new(key: &'static str, label: &'static str, default: f64) -> Self {
        Self {
            key,
            label,
            unit: None,
            default,
            min: None,
            max: None,
        }
    }

    pub const fn unit(self, unit: &'static str) -> Self {
        Self {
            unit: Some(unit),
            ..self
        }
    }

    pub const fn min(self, min: f64) -> Self {
        Self {
            min: Some(min),
            ..self
        }
    }

    pub const fn range(self, min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..self
        }
    }

    fn clamp(&self, value: f64) -> f64 {
        let mut v = value;
        if let Some(min) = self.min {
            v = v.max(min);
        }
        if let Some(max) = self.max {
            v = v.min(max);
        }
        v
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceField {
    pub key: &'static str,
    pub label: &'static str,
    pub options: &'static [&'static str],
    pub default: &'static str,
}

impl ChoiceField {
    pub const fn new(
        key: &'static str,
        label: &'static str,
        options: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self {
            key,
            label,
            options,
            default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextField {
    pub key: &'static str,
    pub label: &'static str,
    pub default: &'static str,
}

impl TextField {
    pub const fn new(key: &'static str, label: &'static str, default: &'static str) -> Self {
        Self {
            key,
            label,
            default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldSpec {
    Number(NumberField),
    Choice(ChoiceField),
    Text(TextField),
}

impl FieldSpec {
    pub fn key(&self) -> &'static str {
        match self {
            FieldSpec::Number(f) => f.key,
            FieldSpec::Choice(f) => f.key,
            FieldSpec::Text(f) => f.key,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubstitutionReason {
    Missing,
    Blank,
    Unparseable,
    NonFinite,
    TrailingText,
    Clamped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Substitution {
    pub field: String,
    pub raw: Option<String>,
    pub applied: String,
    pub reason: SubstitutionReason,
}

pub struct FormReader<'a> {
    form: &'a FormValues,
    substitutions: Vec<Substitution>,
}

impl<'a> FormReader<'a> {
    pub fn new(form: &'a FormValues) -> Self {
        Self {
            form,
            substitutions: Vec::new(),
        }
    }

    pub fn raw(&self, key: &str) -> Option<&'a str> {
        self.form.get(key).map(String::as_str)
    }

    pub fn number(&mut self, field: &NumberField) -> f64 {
        let Some(raw) = self.raw(field.key) else {
            self.record(field.key, None, field.default, SubstitutionReason::Missing);
            return field.default;
        };

        let cleaned = raw.trim().replace(',', "");
        if cleaned.is_empty() {
            self.record(field.key, Some(raw), field.default, SubstitutionReason::Blank);
            return field.default;
        }

        let Some((parsed, consumed)) = parse_float_prefix(&cleaned) else {
            self.record(
                field.key,
                Some(raw),
                field.default,
                SubstitutionReason::Unparseable,
            );
            return field.default;
        };

        if !parsed.is_finite() {
            self.record(
                field.key,
                Some(raw),
                field.default,
                SubstitutionReason::NonFinite,
            );
            return field.default;
        }

        if consumed < cleaned.len() {
            self.record(
                field.key,
                Some(raw),
                parsed,
                SubstitutionReason::TrailingText,
            );
        }

        let clamped = field.clamp(parsed);
        if clamped != parsed {
            self.record(field.key, Some(raw), clamped, SubstitutionReason::Clamped);
        }
        clamped
    }

    pub fn choice(&mut self, field: &ChoiceField) -> CalcResult<&'static str> {
        let raw = match self.raw(field.key) {
            None => {
                self.record_text(field.key, None, field.default, SubstitutionReason::Missing);
                return Ok(field.default);
            }
            Some(raw) if raw.trim().is_empty() => {
                self.record_text(
                    field.key,
                    Some(raw),
                    field.default,
                    SubstitutionReason::Blank,
                );
                return Ok(field.default);
            }
            Some(raw) => raw,
        };

        let wanted = raw.trim().to_ascii_lowercase().replace('_', "-");
        field
            .options
            .iter()
            .copied()
            .find(|option| *option == wanted)
            .ok_or_else(|| CalcError::UnknownOption {
                field: field.key.to_string(),
                value: raw.to_string(),
                allowed: field.options.iter().map(|o| o.to_string()).collect(),
            })
    }

    pub fn text(&mut self, field: &TextField) -> String {
        self.text_or(field, field.default)
    }

    pub fn text_or(&mut self, field: &TextField, default: &str) -> String {
        match self.raw(field.key) {
            None => {
                self.record_text(field.key, None, default, SubstitutionReason::Missing);
                default.to_string()
            }
            Some(raw) if raw.trim().is_empty() => {
                self.record_text(field.key, Some(raw), default, SubstitutionReason::Blank);
                default.to_string()
            }
            Some(raw) => raw.trim().to_string(),
        }
    }

    pub fn substitution_for(&self, key: &str) -> Option<&Substitution> {
        self.substitutions.iter().find(|s| s.field == key)
    }

    pub fn into_substitutions(self) -> Vec<Substitution> {
        self.substitutions
    }

    fn record(&mut self, key: &str, raw: Option<&str>, applied: f64, reason: SubstitutionReason) {
        self.record_text(key, raw, &applied.to_string(), reason);
    }

    fn record_text(
        &mut self,
        key: &str,
        raw: Option<&str>,
        applied: &str,
        reason: SubstitutionReason,
    ) {
        tracing::debug!(field = key, ?raw, applied, ?reason, "field substituted");
        self.substitutions.push(Substitution {
            field: key.to_string(),
            raw: raw.map(str::to_string),
            applied: applied.to_string(),
            reason,
        });
    }
}

/// Parses the longest numeric prefix of `s` the way a browser `parseFloat`
/// does. Returns the value and the number of bytes consumed.
pub fn parse_float_prefix(s: &str) -> Option<(f64, usize)> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut end = 0;

    let negative = bytes.first() == Some(&b'-');
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        let value = if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        return Some((value, end + "Infinity".len()));
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < len && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < len && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        let frac_digits = frac_end - end - 1;
        if digits + frac_digits > 0 {
            digits += frac_digits;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < len && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < len && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < len && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().map(|v| (v, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const AMOUNT: NumberField = NumberField::new("amount", "Amount", 0.0);
    const RATE: NumberField = NumberField::new("rate", "Rate", 5.0).range(0.0, 100.0);
    const PHASE: ChoiceField =
        ChoiceField::new("phase", "Phase", &["dc", "single", "three"], "single");

    fn form(pairs: &[(&str, &str)]) -> FormValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parse_float_prefix_matches_browser_semantics() {
        assert_eq!(parse_float_prefix("12"), Some((12.0, 2)));
        assert_eq!(parse_float_prefix("12abc"), Some((12.0, 2)));
        assert_eq!(parse_float_prefix("-3.5e2x"), Some((-350.0, 6)));
        assert_eq!(parse_float_prefix(".5"), Some((0.5, 2)));
        assert_eq!(parse_float_prefix("5."), Some((5.0, 2)));
        assert_eq!(parse_float_prefix("1e"), Some((1.0, 1)));
        assert_eq!(parse_float_prefix("abc"), None);
        assert_eq!(parse_float_prefix("."), None);
        assert_eq!(parse_float_prefix("-"), None);
        assert!(parse_float_prefix("Infinity").is_some_and(|(v, _)| v.is_infinite()));
    }

    #[test]
    fn missing_and_blank_numbers_use_default() {
        let values = form(&[("amount", "   ")]);
        let mut reader = FormReader::new(&values);
        assert_eq!(reader.number(&AMOUNT), 0.0);
        assert_eq!(reader.number(&RATE), 5.0);

        let subs = reader.into_substitutions();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].reason, SubstitutionReason::Blank);
        assert_eq!(subs[1].reason, SubstitutionReason::Missing);
        assert_eq!(subs[1].applied, "5");
    }

    #[test]
    fn garbage_and_infinity_fall_back_to_default() {
        let values = form(&[("amount", "n/a"), ("rate", "Infinity")]);
        let mut reader = FormReader::new(&values);
        assert_eq!(reader.number(&AMOUNT), 0.0);
        assert_eq!(reader.number(&RATE), 5.0);

        let reasons = reader
            .into_substitutions()
            .into_iter()
            .map(|s| s.reason)
            .collect::<Vec<_>>();
        assert_eq!(
            reasons,
            vec![SubstitutionReason::Unparseable, SubstitutionReason::NonFinite]
        );
    }

    #[test]
    fn thousands_separators_and_trailing_text_are_tolerated() {
        let values = form(&[("amount", "250,000"), ("rate", "6.5%")]);
        let mut reader = FormReader::new(&values);
        assert_eq!(reader.number(&AMOUNT), 250_000.0);
        assert_eq!(reader.number(&RATE), 6.5);

        let subs = reader.into_substitutions();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].field, "rate");
        assert_eq!(subs[0].reason, SubstitutionReason::TrailingText);
    }

    #[test]
    fn out_of_range_numbers_are_clamped_and_recorded() {
        let values = form(&[("rate", "150")]);
        let mut reader = FormReader::new(&values);
        assert_eq!(reader.number(&RATE), 100.0);
        let subs = reader.into_substitutions();
        assert_eq!(subs[0].reason, SubstitutionReason::Clamped);
    }

    #[test]
    fn choices_are_case_insensitive_and_reject_unknown_values() {
        let values = form(&[("phase", "THREE")]);
        let mut reader = FormReader::new(&values);
        assert_eq!(reader.choice(&PHASE), Ok("three"));

        let values = form(&[("phase", "quad")]);
        let mut reader = FormReader::new(&values);
        let err = reader.choice(&PHASE).expect_err("must reject unknown option");
        assert!(err.to_string().contains("phase"));

        let values = form(&[]);
        let mut reader = FormReader::new(&values);
        assert_eq!(reader.choice(&PHASE), Ok("single"));
    }

    proptest! {
        #[test]
        fn prop_number_never_returns_non_finite(raw in ".{0,24}") {
            let values = form(&[("amount", raw.as_str())]);
            let mut reader = FormReader::new(&values);
            let value = reader.number(&AMOUNT);
            prop_assert!(value.is_finite());
        }

        #[test]
        fn prop_formatted_floats_parse_back(value in -1.0e9f64..1.0e9) {
            let text = value.to_string();
            let values = form(&[("amount", text.as_str())]);
            let mut reader = FormReader::new(&values);
            prop_assert_eq!(reader.number(&AMOUNT), value);
            prop_assert!(reader.into_substitutions().is_empty());
        }
    }
}
