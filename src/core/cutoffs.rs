use serde::Serialize;

use super::error::CalcResult;
use super::fields::{ChoiceField, FieldSpec, FormReader, NumberField};
use super::tiers::{self, Tier};
use super::types::{Metric, Report};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Exam {
    Sat,
    Act,
}

impl Exam {
    fn from_option(option: &str) -> Self {
        match option {
            "act" => Exam::Act,
            _ => Exam::Sat,
        }
    }

    fn bounds(self) -> (f64, f64) {
        match self {
            Exam::Sat => (400.0, 1600.0),
            Exam::Act => (1.0, 36.0),
        }
    }

    fn tiers(self) -> &'static [Tier<&'static str>] {
        match self {
            Exam::Sat => &SAT_TIERS,
            Exam::Act => &ACT_TIERS,
        }
    }
}

// Highest tier first so a score on a shared cutoff lands in the higher tier.
const SAT_TIERS: [Tier<&str>; 6] = [
    Tier::new(1500.0, 1600.0, "most selective"),
    Tier::new(1400.0, 1500.0, "highly selective"),
    Tier::new(1300.0, 1400.0, "very selective"),
    Tier::new(1200.0, 1300.0, "selective"),
    Tier::new(1050.0, 1200.0, "moderately selective"),
    Tier::new(400.0, 1050.0, "broad access"),
];

const ACT_TIERS: [Tier<&str>; 6] = [
    Tier::new(34.0, 36.0, "most selective"),
    Tier::new(31.0, 34.0, "highly selective"),
    Tier::new(28.0, 31.0, "very selective"),
    Tier::new(25.0, 28.0, "selective"),
    Tier::new(21.0, 25.0, "moderately selective"),
    Tier::new(1.0, 21.0, "broad access"),
];

pub const EXAM: ChoiceField = ChoiceField::new("exam", "Exam", &["sat", "act"], "sat");
pub const SCORE: NumberField = NumberField::new("score", "Composite score", 1200.0).min(0.0);

pub const FIELDS: [FieldSpec; 2] = [FieldSpec::Choice(EXAM), FieldSpec::Number(SCORE)];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutoffInputs {
    pub exam: Exam,
    pub score: f64,
}

impl CutoffInputs {
    pub fn from_form(form: &mut FormReader<'_>) -> CalcResult<Self> {
        Ok(Self {
            exam: Exam::from_option(form.choice(&EXAM)?),
            score: form.number(&SCORE),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CutoffResult {
    pub exam: Exam,
    pub score: f64,
    pub clamped: bool,
    pub tier: &'static str,
    pub tier_min: f64,
    pub tier_max: f64,
    pub next_tier: Option<&'static str>,
    pub points_to_next_tier: f64,
}

pub fn lookup(inputs: &CutoffInputs) -> CutoffResult {
    let (low, high) = inputs.exam.bounds();
    let score = inputs.score.clamp(low, high);
    let table = inputs.exam.tiers();

    let tier = tiers::lookup(table, score).unwrap_or(&table[table.len() - 1]);
    let next = table.iter().rev().find(|t| t.min > tier.min);

    CutoffResult {
        exam: inputs.exam,
        score,
        clamped: score != inputs.score,
        tier: tier.value,
        tier_min: tier.min,
        tier_max: tier.max,
        next_tier: next.map(|t| t.value),
        points_to_next_tier: next.map_or(0.0, |t| t.min - score),
    }
}

impl Report for CutoffResult {
    fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::number("score", "Score", self.score, 0),
            Metric::number("tierMin", "Tier cutoff", self.tier_min, 0),
            Metric::number("pointsToNextTier", "Points to next tier", self.points_to_next_tier, 0),
        ]
    }

    fn classification(&self) -> Option<String> {
        Some(format!(
            "{} ({:.0} to {:.0})",
            self.tier, self.tier_min, self.tier_max
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn check(exam: Exam, score: f64) -> CutoffResult {
        lookup(&CutoffInputs { exam, score })
    }

    #[test]
    fn shared_cutoff_goes_to_the_higher_tier() {
        let result = check(Exam::Sat, 1400.0);
        assert_eq!(result.tier, "highly selective");
        assert_eq!(result.points_to_next_tier, 100.0);

        let result = check(Exam::Sat, 1399.0);
        assert_eq!(result.tier, "very selective");
        assert_eq!(result.points_to_next_tier, 1.0);

        assert_eq!(check(Exam::Act, 34.0).tier, "most selective");
        assert_eq!(check(Exam::Act, 33.0).tier, "highly selective");
    }

    #[test]
    fn top_tier_has_nothing_above() {
        let result = check(Exam::Act, 36.0);
        assert_eq!(result.next_tier, None);
        assert_eq!(result.points_to_next_tier, 0.0);
        assert_eq!(
            result.classification().as_deref(),
            Some("most selective (34 to 36)")
        );
    }

    #[test]
    fn scores_off_the_scale_are_clamped() {
        let result = check(Exam::Sat, 200.0);
        assert!(result.clamped);
        assert_eq!(result.score, 400.0);
        assert_eq!(result.tier, "broad access");
        assert_eq!(result.next_tier, Some("moderately selective"));

        let result = check(Exam::Act, 40.0);
        assert!(result.clamped);
        assert_eq!(result.score, 36.0);
        assert!(!check(Exam::Act, 30.0).clamped);
    }

    proptest! {
        #[test]
        fn prop_every_sat_score_has_a_tier(score in 0.0f64..2000.0) {
            let result = check(Exam::Sat, score);
            prop_assert!(result.tier_min <= result.score && result.score <= result.tier_max);
            prop_assert!(result.points_to_next_tier >= 0.0);
        }
    }
}
