use serde::Serialize;

use super::error::{CalcError, CalcResult};
use super::fields::{ChoiceField, FieldSpec, FormReader, NumberField, TextField};
use super::types::{Metric, Report};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Length,
    Mass,
    Volume,
    Area,
    Speed,
    Temperature,
}

impl Category {
    fn from_option(option: &str) -> Self {
        match option {
            "mass" => Category::Mass,
            "volume" => Category::Volume,
            "area" => Category::Area,
            "speed" => Category::Speed,
            "temperature" => Category::Temperature,
            _ => Category::Length,
        }
    }

    fn factors(self) -> &'static [(&'static str, f64)] {
        match self {
            Category::Length => &LENGTH_METERS,
            Category::Mass => &MASS_KILOGRAMS,
            Category::Volume => &VOLUME_LITERS,
            Category::Area => &AREA_SQUARE_METERS,
            Category::Speed => &SPEED_METERS_PER_SECOND,
            Category::Temperature => &TEMPERATURE_UNITS,
        }
    }

    fn default_units(self) -> (&'static str, &'static str) {
        match self {
            Category::Length => ("m", "ft"),
            Category::Mass => ("kg", "lb"),
            Category::Volume => ("l", "gal"),
            Category::Area => ("m2", "ft2"),
            Category::Speed => ("km/h", "mph"),
            Category::Temperature => ("c", "f"),
        }
    }

    pub fn units(self) -> impl Iterator<Item = &'static str> {
        self.factors().iter().map(|(unit, _)| *unit)
    }
}

const LENGTH_METERS: [(&str, f64); 9] = [
    ("mm", 0.001),
    ("cm", 0.01),
    ("m", 1.0),
    ("km", 1000.0),
    ("in", 0.0254),
    ("ft", 0.3048),
    ("yd", 0.9144),
    ("mi", 1609.344),
    ("nmi", 1852.0),
];

const MASS_KILOGRAMS: [(&str, f64); 7] = [
    ("mg", 1e-6),
    ("g", 0.001),
    ("kg", 1.0),
    ("t", 1000.0),
    ("oz", 0.028_349_523_125),
    ("lb", 0.453_592_37),
    ("st", 6.350_293_18),
];

const VOLUME_LITERS: [(&str, f64); 9] = [
    ("ml", 0.001),
    ("l", 1.0),
    ("m3", 1000.0),
    ("tsp", 0.004_928_921_593_75),
    ("tbsp", 0.014_786_764_781_25),
    ("cup", 0.236_588_236_5),
    ("floz", 0.029_573_529_562_5),
    ("qt", 0.946_352_946),
    ("gal", 3.785_411_784),
];

const AREA_SQUARE_METERS: [(&str, f64); 7] = [
    ("cm2", 1e-4),
    ("m2", 1.0),
    ("km2", 1e6),
    ("ft2", 0.092_903_04),
    ("yd2", 0.836_127_36),
    ("acre", 4_046.856_422_4),
    ("ha", 10_000.0),
];

const SPEED_METERS_PER_SECOND: [(&str, f64); 5] = [
    ("m/s", 1.0),
    ("km/h", 1.0 / 3.6),
    ("mph", 0.447_04),
    ("ft/s", 0.3048),
    ("kn", 1852.0 / 3600.0),
];

// Temperature is affine; the factor column is unused.
const TEMPERATURE_UNITS: [(&str, f64); 3] = [("c", 1.0), ("f", 1.0), ("k", 1.0)];

pub const CATEGORY: ChoiceField = ChoiceField::new(
    "category",
    "Category",
    &["length", "mass", "volume", "area", "speed", "temperature"],
    "length",
);
pub const VALUE: NumberField = NumberField::new("value", "Value", 1.0);
// Blank units fall back per category, see `Category::default_units`.
pub const FROM: TextField = TextField::new("from", "From unit (blank for category default)", "");
pub const TO: TextField = TextField::new("to", "To unit (blank for category default)", "");

pub const FIELDS: [FieldSpec; 4] = [
    FieldSpec::Choice(CATEGORY),
    FieldSpec::Number(VALUE),
    FieldSpec::Text(FROM),
    FieldSpec::Text(TO),
];

#[derive(Debug, Clone, PartialEq)]
pub struct UnitInputs {
    pub category: Category,
    pub value: f64,
    pub from: String,
    pub to: String,
}

impl UnitInputs {
    pub fn from_form(form: &mut FormReader<'_>) -> CalcResult<Self> {
        let category = Category::from_option(form.choice(&CATEGORY)?);
        let (default_from, default_to) = category.default_units();
        Ok(Self {
            category,
            value: form.number(&VALUE),
            from: form.text_or(&FROM, default_from),
            to: form.text_or(&TO, default_to),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitResult {
    pub category: Category,
    pub value: f64,
    pub from: &'static str,
    pub to: &'static str,
    pub converted: f64,
    pub unit_factor: f64,
}

fn resolve_unit(category: Category, field: &TextField, raw: &str) -> CalcResult<&'static str> {
    let wanted = raw
        .trim()
        .to_ascii_lowercase()
        .replace(['°', ' '], "")
        .replace('³', "3")
        .replace('²', "2");
    category
        .units()
        .find(|unit| *unit == wanted)
        .ok_or_else(|| CalcError::UnknownOption {
            field: field.key.to_string(),
            value: raw.to_string(),
            allowed: category.units().map(str::to_string).collect(),
        })
}

fn to_celsius(unit: &str, value: f64) -> f64 {
    match unit {
        "f" => (value - 32.0) * 5.0 / 9.0,
        "k" => value - 273.15,
        _ => value,
    }
}

fn from_celsius(unit: &str, celsius: f64) -> f64 {
    match unit {
        "f" => celsius * 9.0 / 5.0 + 32.0,
        "k" => celsius + 273.15,
        _ => celsius,
    }
}

fn factor(category: Category, unit: &str) -> f64 {
    category
        .factors()
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, f)| *f)
        .unwrap_or(1.0)
}

fn convert_value(category: Category, from: &str, to: &str, value: f64) -> f64 {
    match category {
        Category::Temperature => from_celsius(to, to_celsius(from, value)),
        _ => value * factor(category, from) / factor(category, to),
    }
}

pub fn convert(inputs: &UnitInputs) -> CalcResult<UnitResult> {
    let from = resolve_unit(inputs.category, &FROM, &inputs.from)?;
    let to = resolve_unit(inputs.category, &TO, &inputs.to)?;

    Ok(UnitResult {
        category: inputs.category,
        value: inputs.value,
        from,
        to,
        converted: convert_value(inputs.category, from, to, inputs.value),
        unit_factor: convert_value(inputs.category, from, to, 1.0),
    })
}

fn significant(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (5 - magnitude).clamp(0, 10) as usize;
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

impl Report for UnitResult {
    fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::number("converted", "Converted value", self.converted, 0).with_display(
                format!("{} {}", significant(self.converted), self.to),
            ),
            Metric::number("unitFactor", "One unit", self.unit_factor, 0).with_display(format!(
                "1 {} = {} {}",
                self.from,
                significant(self.unit_factor),
                self.to
            )),
        ]
    }

    fn classification(&self) -> Option<String> {
        Some(format!(
            "{} {} = {} {}",
            significant(self.value),
            self.from,
            significant(self.converted),
            self.to
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}"
        );
    }

    fn run(category: Category, value: f64, from: &str, to: &str) -> CalcResult<UnitResult> {
        convert(&UnitInputs {
            category,
            value,
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    #[test]
    fn linear_conversions() {
        let miles = run(Category::Length, 10.0, "km", "mi").expect("converts");
        assert_approx(miles.converted, 6.213_711_922, 1e-9);

        let pounds = run(Category::Mass, 1.0, "kg", "lb").expect("converts");
        assert_approx(pounds.converted, 2.204_622_622, 1e-9);
        assert_approx(pounds.unit_factor, pounds.converted, 1e-12);

        let acres = run(Category::Area, 1.0, "ha", "acre").expect("converts");
        assert_approx(acres.converted, 2.471_053_815, 1e-9);
    }

    #[test]
    fn temperature_is_affine() {
        let boiling = run(Category::Temperature, 100.0, "C", "F").expect("converts");
        assert_approx(boiling.converted, 212.0, 1e-9);
        // 1 °C is 33.8 °F, not 1.8
        assert_approx(boiling.unit_factor, 33.8, 1e-9);

        let absolute = run(Category::Temperature, 0.0, "k", "°c").expect("converts");
        assert_approx(absolute.converted, -273.15, 1e-9);
    }

    #[test]
    fn unit_names_are_normalized() {
        let result = run(Category::Area, 1.0, "M²", "ft2").expect("converts");
        assert_eq!(result.from, "m2");
        assert_approx(result.converted, 10.763_910_417, 1e-6);
    }

    #[test]
    fn unknown_unit_lists_allowed_units() {
        let err = run(Category::Mass, 1.0, "kg", "furlong").expect_err("rejected");
        match err {
            CalcError::UnknownOption { field, allowed, .. } => {
                assert_eq!(field, "to");
                assert!(allowed.contains(&"lb".to_string()));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn blank_units_follow_the_category() {
        let form = [("category", "temperature"), ("value", "20")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut reader = FormReader::new(&form);
        let inputs = UnitInputs::from_form(&mut reader).expect("valid form");
        assert_eq!((inputs.from.as_str(), inputs.to.as_str()), ("c", "f"));
        let result = convert(&inputs).expect("converts");
        assert_approx(result.converted, 68.0, 1e-9);
        assert_eq!(reader.into_substitutions().len(), 2);
    }

    #[test]
    fn catalogue_does_not_advertise_length_units() {
        assert_eq!(FROM.default, "");
        assert_eq!(TO.default, "");
        for category in [Category::Mass, Category::Temperature, Category::Speed] {
            let (from, to) = category.default_units();
            assert!(category.units().any(|u| u == from));
            assert!(category.units().any(|u| u == to));
        }
    }

    #[test]
    fn classification_reads_naturally() {
        let result = run(Category::Length, 1.0, "ft", "in").expect("converts");
        assert_eq!(result.classification().as_deref(), Some("1 ft = 12 in"));
    }

    proptest! {
        #[test]
        fn prop_round_trip_returns_the_input(value in -1e6f64..1e6, from_idx in 0usize..9, to_idx in 0usize..9) {
            let from = LENGTH_METERS[from_idx].0;
            let to = LENGTH_METERS[to_idx].0;
            let there = run(Category::Length, value, from, to).expect("converts");
            let back = run(Category::Length, there.converted, to, from).expect("converts");
            prop_assert!((back.converted - value).abs() <= 1e-6 * value.abs().max(1.0));
        }
    }
}
