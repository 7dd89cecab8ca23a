use serde::Serialize;

use super::aggregate::{self, AggregateInputs, AggregateResult};
use super::cutoffs::{self, CutoffInputs, CutoffResult};
use super::electrical::{
    self, AmpsToKwInputs, AmpsToKwResult, KwToAmpsInputs, KwToAmpsResult,
};
use super::error::{CalcError, CalcResult};
use super::fields::{FieldSpec, FormReader, FormValues, Substitution};
use super::fraction::{self, FractionResult, PercentToFractionInputs};
use super::mortgage::{self, MortgageInputs, MortgageResult};
use super::names::{self, NameInputs, NameResult};
use super::options::{self, BlackScholesInputs, BlackScholesResult};
use super::pool_pump::{self, PoolPumpInputs, PoolPumpResult};
use super::sade_sati::{self, SadeSatiInputs, SadeSatiResult};
use super::tax::{self, IncomeTaxInputs, IncomeTaxResult};
use super::title_insurance::{self, TitleInsuranceInputs, TitleInsuranceResult};
use super::types::{Metric, Report};
use super::units::{self, UnitInputs, UnitResult};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    Aggregate,
    AmpsToKw,
    KwToAmps,
    PercentToFraction,
    BlackScholes,
    Mortgage,
    IncomeTax,
    PoolPump,
    TitleInsurance,
    SadeSati,
    NameGenerator,
    UnitConverter,
    SchoolCutoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToolInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Tool {
    pub const ALL: [Tool; 13] = [
        Tool::Aggregate,
        Tool::AmpsToKw,
        Tool::KwToAmps,
        Tool::PercentToFraction,
        Tool::BlackScholes,
        Tool::Mortgage,
        Tool::IncomeTax,
        Tool::PoolPump,
        Tool::TitleInsurance,
        Tool::SadeSati,
        Tool::NameGenerator,
        Tool::UnitConverter,
        Tool::SchoolCutoff,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Tool::Aggregate => "aggregate",
            Tool::AmpsToKw => "amps-to-kw",
            Tool::KwToAmps => "kw-to-amps",
            Tool::PercentToFraction => "percent-to-fraction",
            Tool::BlackScholes => "black-scholes",
            Tool::Mortgage => "mortgage",
            Tool::IncomeTax => "income-tax",
            Tool::PoolPump => "pool-pump",
            Tool::TitleInsurance => "title-insurance",
            Tool::SadeSati => "sade-sati",
            Tool::NameGenerator => "name-generator",
            Tool::UnitConverter => "unit-converter",
            Tool::SchoolCutoff => "school-cutoff",
        }
    }

    // Accepts the kebab-case id, case-insensitively, with `_` for `-`.
    pub fn from_id(id: &str) -> CalcResult<Self> {
        let wanted = id.trim().to_ascii_lowercase().replace('_', "-");
        Tool::ALL
            .into_iter()
            .find(|tool| tool.id() == wanted)
            .ok_or_else(|| CalcError::UnknownTool(id.to_string()))
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Tool::Aggregate => &aggregate::FIELDS,
            Tool::AmpsToKw => &electrical::FIELDS,
            Tool::KwToAmps => &electrical::KW_TO_AMPS_FIELDS,
            Tool::PercentToFraction => &fraction::FIELDS,
            Tool::BlackScholes => &options::FIELDS,
            Tool::Mortgage => &mortgage::FIELDS,
            Tool::IncomeTax => &tax::FIELDS,
            Tool::PoolPump => &pool_pump::FIELDS,
            Tool::TitleInsurance => &title_insurance::FIELDS,
            Tool::SadeSati => &sade_sati::FIELDS,
            Tool::NameGenerator => &names::FIELDS,
            Tool::UnitConverter => &units::FIELDS,
            Tool::SchoolCutoff => &cutoffs::FIELDS,
        }
    }

    pub fn describe(self) -> (&'static str, &'static str) {
        match self {
            Tool::Aggregate => (
                "Gravel & Aggregate Calculator",
                "Volume, weight and cost of gravel, sand, soil or mulch for a rectangular area.",
            ),
            Tool::AmpsToKw => (
                "Amps to kW Converter",
                "Real power from current and voltage for DC, single-phase and three-phase circuits.",
            ),
            Tool::KwToAmps => (
                "kW to Amps Converter",
                "Current drawn by a load of known power for DC, single-phase and three-phase circuits.",
            ),
            Tool::PercentToFraction => (
                "Percent to Fraction Converter",
                "Exact simplified fraction and mixed number for a percentage.",
            ),
            Tool::BlackScholes => (
                "Black-Scholes Option Calculator",
                "European call and put prices with Greeks under continuous dividend yield.",
            ),
            Tool::Mortgage => (
                "Mortgage Calculator (PITI)",
                "Monthly principal, interest, taxes, insurance, HOA and PMI with a yearly schedule.",
            ),
            Tool::IncomeTax => (
                "Income Tax Calculator",
                "US federal income tax on 2024 brackets with effective and marginal rates.",
            ),
            Tool::PoolPump => (
                "Pool Pump Size Calculator",
                "Pool volume, required flow and pump horsepower for a target turnover.",
            ),
            Tool::TitleInsurance => (
                "Title Insurance Calculator",
                "Tiered owner's policy premium plus a simultaneous lender's policy.",
            ),
            Tool::SadeSati => (
                "Sade Sati Calculator",
                "Saturn's transit relative to a moon sign, with Sade Sati and Dhaiya periods.",
            ),
            Tool::NameGenerator => (
                "Name Generator",
                "Reproducible business, brand or fantasy name ideas built from a keyword.",
            ),
            Tool::UnitConverter => (
                "Unit Converter",
                "Length, mass, volume, area, speed and temperature conversions.",
            ),
            Tool::SchoolCutoff => (
                "School Cutoff Score Lookup",
                "Selectivity tier for an SAT or ACT score and the points needed to reach the next one.",
            ),
        }
    }

    pub fn info(self) -> ToolInfo {
        let (title, description) = self.describe();
        ToolInfo {
            id: self.id(),
            title,
            description,
            fields: self.fields(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResult {
    Aggregate(AggregateResult),
    AmpsToKw(AmpsToKwResult),
    KwToAmps(KwToAmpsResult),
    PercentToFraction(FractionResult),
    BlackScholes(BlackScholesResult),
    Mortgage(MortgageResult),
    IncomeTax(IncomeTaxResult),
    PoolPump(PoolPumpResult),
    TitleInsurance(TitleInsuranceResult),
    SadeSati(SadeSatiResult),
    NameGenerator(NameResult),
    UnitConverter(UnitResult),
    SchoolCutoff(CutoffResult),
}

impl ToolResult {
    fn report(&self) -> &dyn Report {
        match self {
            ToolResult::Aggregate(r) => r,
            ToolResult::AmpsToKw(r) => r,
            ToolResult::KwToAmps(r) => r,
            ToolResult::PercentToFraction(r) => r,
            ToolResult::BlackScholes(r) => r,
            ToolResult::Mortgage(r) => r,
            ToolResult::IncomeTax(r) => r,
            ToolResult::PoolPump(r) => r,
            ToolResult::TitleInsurance(r) => r,
            ToolResult::SadeSati(r) => r,
            ToolResult::NameGenerator(r) => r,
            ToolResult::UnitConverter(r) => r,
            ToolResult::SchoolCutoff(r) => r,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub tool: Tool,
    pub result: ToolResult,
    pub metrics: Vec<Metric>,
    pub classification: Option<String>,
    pub substitutions: Vec<Substitution>,
}

fn compute(tool: Tool, form: &mut FormReader<'_>) -> CalcResult<ToolResult> {
    Ok(match tool {
        Tool::Aggregate => {
            ToolResult::Aggregate(aggregate::calculate(&AggregateInputs::from_form(form)?))
        }
        Tool::AmpsToKw => {
            ToolResult::AmpsToKw(electrical::amps_to_kw(&AmpsToKwInputs::from_form(form)?))
        }
        Tool::KwToAmps => ToolResult::KwToAmps(electrical::kw_to_amps_report(
            &KwToAmpsInputs::from_form(form)?,
        )),
        Tool::PercentToFraction => ToolResult::PercentToFraction(fraction::percent_to_fraction(
            &PercentToFractionInputs::from_form(form),
        )),
        Tool::BlackScholes => ToolResult::BlackScholes(options::black_scholes(
            &BlackScholesInputs::from_form(form)?,
        )?),
        Tool::Mortgage => {
            ToolResult::Mortgage(mortgage::calculate(&MortgageInputs::from_form(form)?))
        }
        Tool::IncomeTax => {
            ToolResult::IncomeTax(tax::calculate(&IncomeTaxInputs::from_form(form)?))
        }
        Tool::PoolPump => {
            ToolResult::PoolPump(pool_pump::calculate(&PoolPumpInputs::from_form(form)?))
        }
        Tool::TitleInsurance => ToolResult::TitleInsurance(title_insurance::calculate(
            &TitleInsuranceInputs::from_form(form),
        )),
        Tool::SadeSati => {
            ToolResult::SadeSati(sade_sati::calculate(&SadeSatiInputs::from_form(form)?))
        }
        Tool::NameGenerator => {
            ToolResult::NameGenerator(names::generate(&NameInputs::from_form(form)?))
        }
        Tool::UnitConverter => {
            ToolResult::UnitConverter(units::convert(&UnitInputs::from_form(form)?)?)
        }
        Tool::SchoolCutoff => {
            ToolResult::SchoolCutoff(cutoffs::lookup(&CutoffInputs::from_form(form)?))
        }
    })
}

pub fn evaluate(tool: Tool, values: &FormValues) -> CalcResult<Evaluation> {
    let mut form = FormReader::new(values);
    let result = compute(tool, &mut form)?;
    let report = result.report();
    let metrics = report.metrics();
    let classification = report.classification();

    Ok(Evaluation {
        tool,
        metrics,
        classification,
        substitutions: form.into_substitutions(),
        result,
    })
}
