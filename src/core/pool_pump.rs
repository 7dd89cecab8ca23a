use serde::Serialize;

use super::error::CalcResult;
use super::fields::{ChoiceField, FieldSpec, FormReader, NumberField};
use super::tiers::{self, Tier};
use super::types::{Metric, Report};

const GALLONS_PER_CUBIC_FOOT: f64 = 7.48;
// 7.48 × π/4 rounded the way pool trade tables quote it.
const ROUND_GALLON_FACTOR: f64 = 5.9;
const LITERS_PER_GALLON: f64 = 3.785_411_784;
// Water horsepower constant: GPM × ft of head / 3960.
const WATER_HP_DIVISOR: f64 = 3960.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PoolShape {
    Rectangle,
    Round,
    Oval,
}

impl PoolShape {
    fn from_option(option: &str) -> Self {
        match option {
            "round" => PoolShape::Round,
            "oval" => PoolShape::Oval,
            _ => PoolShape::Rectangle,
        }
    }
}

const MOTOR_SIZES: [Tier<(&str, f64)>; 7] = [
    Tier::new(0.0, 0.5, ("1/2 HP", 0.5)),
    Tier::new(0.5, 0.75, ("3/4 HP", 0.75)),
    Tier::new(0.75, 1.0, ("1 HP", 1.0)),
    Tier::new(1.0, 1.5, ("1.5 HP", 1.5)),
    Tier::new(1.5, 2.0, ("2 HP", 2.0)),
    Tier::new(2.0, 2.5, ("2.5 HP", 2.5)),
    Tier::new(2.5, 3.0, ("3 HP", 3.0)),
];

// Smallest pipe keeping suction velocity near 6 ft/s, by GPM.
const PIPE_SIZES: [Tier<&str>; 5] = [
    Tier::new(0.0, 45.0, "1.5 in"),
    Tier::new(45.0, 73.0, "2 in"),
    Tier::new(73.0, 105.0, "2.5 in"),
    Tier::new(105.0, 160.0, "3 in"),
    Tier::new(160.0, f64::MAX, "4 in"),
];

pub const SHAPE: ChoiceField = ChoiceField::new(
    "shape",
    "Pool shape",
    &["rectangle", "round", "oval"],
    "rectangle",
);
pub const LENGTH: NumberField = NumberField::new("length", "Length (diameter if round)", 0.0)
    .unit("ft")
    .min(0.0);
pub const WIDTH: NumberField = NumberField::new("width", "Width", 0.0)
    .unit("ft")
    .min(0.0);
pub const SHALLOW_DEPTH: NumberField = NumberField::new("shallowDepth", "Shallow end depth", 0.0)
    .unit("ft")
    .min(0.0);
pub const DEEP_DEPTH: NumberField = NumberField::new("deepDepth", "Deep end depth", 0.0)
    .unit("ft")
    .min(0.0);
pub const TURNOVER_HOURS: NumberField = NumberField::new("turnoverHours", "Turnover time", 8.0)
    .unit("h")
    .range(1.0, 24.0);
pub const HEAD_FEET: NumberField = NumberField::new("tdh", "Total dynamic head", 50.0)
    .unit("ft")
    .range(1.0, 200.0);
pub const EFFICIENCY: NumberField = NumberField::new("efficiency", "Pump efficiency", 50.0)
    .unit("%")
    .range(5.0, 100.0);

pub const FIELDS: [FieldSpec; 8] = [
    FieldSpec::Choice(SHAPE),
    FieldSpec::Number(LENGTH),
    FieldSpec::Number(WIDTH),
    FieldSpec::Number(SHALLOW_DEPTH),
    FieldSpec::Number(DEEP_DEPTH),
    FieldSpec::Number(TURNOVER_HOURS),
    FieldSpec::Number(HEAD_FEET),
    FieldSpec::Number(EFFICIENCY),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolPumpInputs {
    pub shape: PoolShape,
    pub length_ft: f64,
    pub width_ft: f64,
    pub shallow_depth_ft: f64,
    pub deep_depth_ft: f64,
    pub turnover_hours: f64,
    pub head_ft: f64,
    pub efficiency: f64,
}

impl PoolPumpInputs {
    pub fn from_form(form: &mut FormReader<'_>) -> CalcResult<Self> {
        Ok(Self {
            shape: PoolShape::from_option(form.choice(&SHAPE)?),
            length_ft: form.number(&LENGTH),
            width_ft: form.number(&WIDTH),
            shallow_depth_ft: form.number(&SHALLOW_DEPTH),
            deep_depth_ft: form.number(&DEEP_DEPTH),
            turnover_hours: form.number(&TURNOVER_HOURS),
            head_ft: form.number(&HEAD_FEET),
            efficiency: form.number(&EFFICIENCY) / 100.0,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolPumpResult {
    pub shape: PoolShape,
    pub volume_gallons: f64,
    pub volume_liters: f64,
    pub gpm: f64,
    pub gph: f64,
    pub brake_hp: f64,
    pub pump_size: Option<&'static str>,
    pub nominal_hp: Option<f64>,
    pub pipe_size: &'static str,
}

pub fn pool_volume_gallons(inputs: &PoolPumpInputs) -> f64 {
    let average_depth = (inputs.shallow_depth_ft + inputs.deep_depth_ft) / 2.0;
    match inputs.shape {
        PoolShape::Rectangle => {
            inputs.length_ft * inputs.width_ft * average_depth * GALLONS_PER_CUBIC_FOOT
        }
        PoolShape::Round => {
            inputs.length_ft * inputs.length_ft * average_depth * ROUND_GALLON_FACTOR
        }
        PoolShape::Oval => inputs.length_ft * inputs.width_ft * average_depth * ROUND_GALLON_FACTOR,
    }
}

pub fn calculate(inputs: &PoolPumpInputs) -> PoolPumpResult {
    let volume_gallons = pool_volume_gallons(inputs).max(0.0);
    let turnover_minutes = inputs.turnover_hours.max(1.0) * 60.0;
    let gpm = volume_gallons / turnover_minutes;
    let efficiency = inputs.efficiency.clamp(0.05, 1.0);
    let brake_hp = gpm * inputs.head_ft.max(0.0) / (WATER_HP_DIVISOR * efficiency);

    let motor = tiers::lookup(&MOTOR_SIZES, brake_hp);
    let pipe_size = tiers::lookup(&PIPE_SIZES, gpm)
        .map(|tier| tier.value)
        .unwrap_or(PIPE_SIZES[PIPE_SIZES.len() - 1].value);

    PoolPumpResult {
        shape: inputs.shape,
        volume_gallons,
        volume_liters: volume_gallons * LITERS_PER_GALLON,
        gpm,
        gph: gpm * 60.0,
        brake_hp,
        pump_size: motor.map(|tier| tier.value.0),
        nominal_hp: motor.map(|tier| tier.value.1),
        pipe_size,
    }
}

impl Report for PoolPumpResult {
    fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::number("volumeGallons", "Pool volume", self.volume_gallons, 0)
                .with_unit("gal"),
            Metric::number("volumeLiters", "Pool volume", self.volume_liters, 0).with_unit("L"),
            Metric::number("gpm", "Required flow", self.gpm, 1).with_unit("GPM"),
            Metric::number("gph", "Required flow", self.gph, 0).with_unit("GPH"),
            Metric::number("brakeHp", "Required brake horsepower", self.brake_hp, 2)
                .with_unit("HP"),
        ]
    }

    fn classification(&self) -> Option<String> {
        Some(match self.pump_size {
            Some(size) => format!("{size} pump, {} plumbing", self.pipe_size),
            None => "Commercial pump required".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn backyard() -> PoolPumpInputs {
        PoolPumpInputs {
            shape: PoolShape::Rectangle,
            length_ft: 32.0,
            width_ft: 16.0,
            shallow_depth_ft: 3.5,
            deep_depth_ft: 6.5,
            turnover_hours: 8.0,
            head_ft: 50.0,
            efficiency: 0.5,
        }
    }

    #[test]
    fn rectangular_pool_sizing() {
        let result = calculate(&backyard());
        assert!((result.volume_gallons - 19_148.8).abs() < 1e-6);
        assert!((result.gpm - 39.893).abs() < 1e-3);
        assert!((result.gph - result.gpm * 60.0).abs() < 1e-9);
        assert!((result.brake_hp - 1.0074).abs() < 1e-3);
        assert_eq!(result.pump_size, Some("1.5 HP"));
        assert_eq!(result.pipe_size, "1.5 in");
    }

    #[test]
    fn round_pool_uses_diameter() {
        let mut inputs = backyard();
        inputs.shape = PoolShape::Round;
        inputs.length_ft = 24.0;
        inputs.shallow_depth_ft = 4.0;
        inputs.deep_depth_ft = 4.0;
        let result = calculate(&inputs);
        assert!((result.volume_gallons - 24.0 * 24.0 * 4.0 * 5.9).abs() < 1e-9);
    }

    #[test]
    fn oversize_pool_needs_commercial_pump() {
        let mut inputs = backyard();
        inputs.length_ft = 150.0;
        inputs.width_ft = 75.0;
        let result = calculate(&inputs);
        assert!(result.pump_size.is_none());
        assert_eq!(
            result.classification().as_deref(),
            Some("Commercial pump required")
        );
    }

    #[test]
    fn empty_pool_gets_smallest_pump() {
        let mut inputs = backyard();
        inputs.length_ft = 0.0;
        let result = calculate(&inputs);
        assert_eq!(result.gpm, 0.0);
        assert_eq!(result.pump_size, Some("1/2 HP"));
    }

    proptest! {
        #[test]
        fn prop_longer_turnover_lowers_flow(
            length in 1.0f64..60.0,
            width in 1.0f64..30.0,
            hours in 1.0f64..23.0,
        ) {
            let mut inputs = backyard();
            inputs.length_ft = length;
            inputs.width_ft = width;
            inputs.turnover_hours = hours;
            let fast = calculate(&inputs);
            inputs.turnover_hours = hours + 1.0;
            let slow = calculate(&inputs);
            prop_assert!(slow.gpm < fast.gpm);
            prop_assert!(slow.brake_hp <= fast.brake_hp);
        }
    }
}
