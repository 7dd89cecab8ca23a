use serde::Serialize;

use super::error::CalcResult;
use super::fields::{ChoiceField, FieldSpec, FormReader, NumberField};
use super::types::{Metric, Report};

const SQRT_3: f64 = 1.732_050_807_568_877_2;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Dc,
    Single,
    Three,
}

impl Phase {
    fn from_option(option: &str) -> Self {
        match option {
            "dc" => Phase::Dc,
            "three" => Phase::Three,
            _ => Phase::Single,
        }
    }

    fn line_factor(self) -> f64 {
        match self {
            Phase::Dc | Phase::Single => 1.0,
            Phase::Three => SQRT_3,
        }
    }
}

pub const PHASE: ChoiceField =
    ChoiceField::new("phase", "Current type", &["dc", "single", "three"], "single");
pub const AMPS: NumberField = NumberField::new("amps", "Current", 0.0)
    .unit("A")
    .min(0.0);
pub const VOLTS: NumberField = NumberField::new("volts", "Voltage", 0.0)
    .unit("V")
    .min(0.0);
pub const POWER_FACTOR: NumberField =
    NumberField::new("powerFactor", "Power factor", 0.8).range(0.0, 1.0);
pub const KILOWATTS: NumberField = NumberField::new("kilowatts", "Real power", 0.0)
    .unit("kW")
    .min(0.0);

pub const FIELDS: [FieldSpec; 4] = [
    FieldSpec::Choice(PHASE),
    FieldSpec::Number(AMPS),
    FieldSpec::Number(VOLTS),
    FieldSpec::Number(POWER_FACTOR),
];

pub const KW_TO_AMPS_FIELDS: [FieldSpec; 4] = [
    FieldSpec::Choice(PHASE),
    FieldSpec::Number(KILOWATTS),
    FieldSpec::Number(VOLTS),
    FieldSpec::Number(POWER_FACTOR),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmpsToKwInputs {
    pub phase: Phase,
    pub amps: f64,
    pub volts: f64,
    pub power_factor: f64,
}

impl AmpsToKwInputs {
    pub fn from_form(form: &mut FormReader<'_>) -> CalcResult<Self> {
        Ok(Self {
            phase: Phase::from_option(form.choice(&PHASE)?),
            amps: form.number(&AMPS),
            volts: form.number(&VOLTS),
            power_factor: form.number(&POWER_FACTOR),
        })
    }

    fn effective_power_factor(&self) -> f64 {
        match self.phase {
            Phase::Dc => 1.0,
            Phase::Single | Phase::Three => self.power_factor.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmpsToKwResult {
    pub phase: Phase,
    pub kilowatts: f64,
    pub watts: f64,
    pub kilovolt_amps: f64,
    pub power_factor: f64,
}

pub fn amps_to_kw(inputs: &AmpsToKwInputs) -> AmpsToKwResult {
    let pf = inputs.effective_power_factor();
    let apparent_va = inputs.phase.line_factor() * inputs.amps * inputs.volts;
    let watts = apparent_va * pf;

    AmpsToKwResult {
        phase: inputs.phase,
        kilowatts: watts / 1000.0,
        watts,
        kilovolt_amps: apparent_va / 1000.0,
        power_factor: pf,
    }
}

pub fn kw_to_amps(phase: Phase, kilowatts: f64, volts: f64, power_factor: f64) -> f64 {
    let pf = match phase {
        Phase::Dc => 1.0,
        Phase::Single | Phase::Three => power_factor.clamp(0.0, 1.0),
    };
    let denom = phase.line_factor() * volts * pf;
    if denom <= 0.0 {
        return 0.0;
    }
    kilowatts * 1000.0 / denom
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KwToAmpsInputs {
    pub phase: Phase,
    pub kilowatts: f64,
    pub volts: f64,
    pub power_factor: f64,
}

impl KwToAmpsInputs {
    pub fn from_form(form: &mut FormReader<'_>) -> CalcResult<Self> {
        Ok(Self {
            phase: Phase::from_option(form.choice(&PHASE)?),
            kilowatts: form.number(&KILOWATTS),
            volts: form.number(&VOLTS),
            power_factor: form.number(&POWER_FACTOR),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KwToAmpsResult {
    pub phase: Phase,
    pub amps: f64,
    pub kilowatts: f64,
}

pub fn kw_to_amps_report(inputs: &KwToAmpsInputs) -> KwToAmpsResult {
    KwToAmpsResult {
        phase: inputs.phase,
        amps: kw_to_amps(
            inputs.phase,
            inputs.kilowatts,
            inputs.volts,
            inputs.power_factor,
        ),
        kilowatts: inputs.kilowatts,
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Dc => "DC circuit",
        Phase::Single => "Single-phase AC",
        Phase::Three => "Three-phase AC (line-to-line voltage)",
    }
}

impl Report for KwToAmpsResult {
    fn metrics(&self) -> Vec<Metric> {
        vec![Metric::number("amps", "Current", self.amps, 2).with_unit("A")]
    }

    fn classification(&self) -> Option<String> {
        Some(phase_label(self.phase).to_string())
    }
}

impl Report for AmpsToKwResult {
    fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::number("kilowatts", "Real power", self.kilowatts, 2).with_unit("kW"),
            Metric::number("watts", "Real power", self.watts, 0).with_unit("W"),
            Metric::number("kilovoltAmps", "Apparent power", self.kilovolt_amps, 2)
                .with_unit("kVA"),
            Metric::number("powerFactor", "Power factor", self.power_factor, 2),
        ]
    }

    fn classification(&self) -> Option<String> {
        Some(phase_label(self.phase).to_string())
    }
}
