use serde::Serialize;

use super::error::CalcResult;
use super::fields::{ChoiceField, FieldSpec, FormReader, NumberField};
use super::types::{Metric, Report};

const CUBIC_FEET_PER_YARD: f64 = 27.0;
const CUBIC_METERS_PER_YARD: f64 = 0.764_554_857_984;
const TONNES_PER_SHORT_TON: f64 = 0.907_184_74;

// Bulk densities in short tons per cubic yard.
pub const MATERIAL_DENSITIES: [(&str, f64); 8] = [
    ("crushed-stone", 1.5),
    ("pea-gravel", 1.4),
    ("river-rock", 1.35),
    ("crusher-run", 1.6),
    ("sand", 1.35),
    ("topsoil", 1.1),
    ("fill-dirt", 1.2),
    ("mulch", 0.4),
];

const MATERIAL_NAMES: [&str; 8] = [
    "crushed-stone",
    "pea-gravel",
    "river-rock",
    "crusher-run",
    "sand",
    "topsoil",
    "fill-dirt",
    "mulch",
];

pub const LENGTH: NumberField = NumberField::new("length", "Length", 0.0)
    .unit("ft")
    .min(0.0);
pub const WIDTH: NumberField = NumberField::new("width", "Width", 0.0)
    .unit("ft")
    .min(0.0);
pub const DEPTH: NumberField = NumberField::new("depth", "Depth", 0.0)
    .unit("in")
    .min(0.0);
pub const MATERIAL: ChoiceField =
    ChoiceField::new("material", "Material", &MATERIAL_NAMES, "crushed-stone");
pub const DENSITY: NumberField = NumberField::new("density", "Density (0 = material default)", 0.0)
    .unit("t/yd³")
    .min(0.0);
pub const WASTE: NumberField = NumberField::new("waste", "Waste allowance", 0.0)
    .unit("%")
    .range(0.0, 100.0);
pub const PRICE_PER_TON: NumberField = NumberField::new("pricePerTon", "Price per ton", 0.0)
    .unit("$")
    .min(0.0);

pub const FIELDS: [FieldSpec; 7] = [
    FieldSpec::Number(LENGTH),
    FieldSpec::Number(WIDTH),
    FieldSpec::Number(DEPTH),
    FieldSpec::Choice(MATERIAL),
    FieldSpec::Number(DENSITY),
    FieldSpec::Number(WASTE),
    FieldSpec::Number(PRICE_PER_TON),
];

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateInputs {
    pub length_ft: f64,
    pub width_ft: f64,
    pub depth_in: f64,
    pub material: &'static str,
    pub density_override: f64,
    pub waste_percent: f64,
    pub price_per_ton: f64,
}

impl AggregateInputs {
    pub fn from_form(form: &mut FormReader<'_>) -> CalcResult<Self> {
        Ok(Self {
            length_ft: form.number(&LENGTH),
            width_ft: form.number(&WIDTH),
            depth_in: form.number(&DEPTH),
            material: form.choice(&MATERIAL)?,
            density_override: form.number(&DENSITY),
            waste_percent: form.number(&WASTE),
            price_per_ton: form.number(&PRICE_PER_TON),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub material: &'static str,
    pub density: f64,
    pub cubic_feet: f64,
    pub cubic_yards: f64,
    pub cubic_meters: f64,
    pub tons: f64,
    pub tonnes: f64,
    pub total_cost: f64,
}

pub fn material_density(material: &str) -> Option<f64> {
    MATERIAL_DENSITIES
        .iter()
        .find(|(name, _)| *name == material)
        .map(|(_, density)| *density)
}

pub fn calculate(inputs: &AggregateInputs) -> AggregateResult {
    let density = if inputs.density_override > 0.0 {
        inputs.density_override
    } else {
        material_density(inputs.material).unwrap_or(MATERIAL_DENSITIES[0].1)
    };

    let waste_factor = 1.0 + inputs.waste_percent.max(0.0) / 100.0;
    let cubic_feet =
        inputs.length_ft * inputs.width_ft * (inputs.depth_in / 12.0) * waste_factor;
    let cubic_yards = cubic_feet / CUBIC_FEET_PER_YARD;
    let tons = cubic_yards * density;

    AggregateResult {
        material: inputs.material,
        density,
        cubic_feet,
        cubic_yards,
        cubic_meters: cubic_yards * CUBIC_METERS_PER_YARD,
        tons,
        tonnes: tons * TONNES_PER_SHORT_TON,
        total_cost: tons * inputs.price_per_ton,
    }
}

impl Report for AggregateResult {
    fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::number("cubicYards", "Volume", self.cubic_yards, 2).with_unit("yd³"),
            Metric::number("cubicFeet", "Volume", self.cubic_feet, 1).with_unit("ft³"),
            Metric::number("cubicMeters", "Volume", self.cubic_meters, 2).with_unit("m³"),
            Metric::number("tons", "Weight", self.tons, 2).with_unit("tons"),
            Metric::number("tonnes", "Weight", self.tonnes, 2).with_unit("t"),
            Metric::number("density", "Density used", self.density, 2).with_unit("t/yd³"),
            Metric::currency("totalCost", "Estimated cost", self.total_cost),
        ]
    }
}
