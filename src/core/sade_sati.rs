use chrono::{Local, NaiveDate};
use serde::Serialize;

use super::error::{CalcError, CalcResult};
use super::fields::{ChoiceField, FieldSpec, FormReader, TextField};
use super::types::{Metric, Report};

pub const SIGNS: [&str; 12] = [
    "aries",
    "taurus",
    "gemini",
    "cancer",
    "leo",
    "virgo",
    "libra",
    "scorpio",
    "sagittarius",
    "capricorn",
    "aquarius",
    "pisces",
];

const SIGN_LABELS: [&str; 12] = [
    "Aries (Mesha)",
    "Taurus (Vrishabha)",
    "Gemini (Mithuna)",
    "Cancer (Karka)",
    "Leo (Simha)",
    "Virgo (Kanya)",
    "Libra (Tula)",
    "Scorpio (Vrishchika)",
    "Sagittarius (Dhanu)",
    "Capricorn (Makara)",
    "Aquarius (Kumbha)",
    "Pisces (Meena)",
];

// Saturn's forward sidereal ingresses: (sign index, year, month, day).
const SATURN_INGRESSES: [(usize, i32, u32, u32); 13] = [
    (5, 2009, 9, 9),
    (6, 2011, 11, 15),
    (7, 2014, 11, 2),
    (8, 2017, 1, 26),
    (9, 2020, 1, 24),
    (10, 2023, 1, 17),
    (11, 2025, 3, 29),
    (0, 2027, 6, 3),
    (1, 2029, 8, 8),
    (2, 2032, 5, 31),
    (3, 2034, 7, 13),
    (4, 2036, 8, 27),
    (5, 2038, 10, 22),
];

const EPHEMERIS_END: (i32, u32, u32) = (2041, 1, 1);

pub const MOON_SIGN: ChoiceField = ChoiceField::new("moonSign", "Moon sign", &SIGNS, "aries");
pub const DATE: TextField = TextField::new("date", "Date (YYYY-MM-DD)", "today");

pub const FIELDS: [FieldSpec; 2] = [FieldSpec::Choice(MOON_SIGN), FieldSpec::Text(DATE)];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaturnPhase {
    Rising,
    Peak,
    Setting,
    DhaiyaFourth,
    DhaiyaEighth,
    Clear,
}

impl SaturnPhase {
    fn from_house(house: u8) -> Self {
        match house {
            12 => SaturnPhase::Rising,
            1 => SaturnPhase::Peak,
            2 => SaturnPhase::Setting,
            4 => SaturnPhase::DhaiyaFourth,
            8 => SaturnPhase::DhaiyaEighth,
            _ => SaturnPhase::Clear,
        }
    }

    pub fn is_sade_sati(self) -> bool {
        matches!(
            self,
            SaturnPhase::Rising | SaturnPhase::Peak | SaturnPhase::Setting
        )
    }

    fn label(self) -> &'static str {
        match self {
            SaturnPhase::Rising => "Sade Sati: rising phase",
            SaturnPhase::Peak => "Sade Sati: peak phase",
            SaturnPhase::Setting => "Sade Sati: setting phase",
            SaturnPhase::DhaiyaFourth => "Dhaiya: Saturn in the 4th from the moon",
            SaturnPhase::DhaiyaEighth => "Dhaiya: Saturn in the 8th from the moon",
            SaturnPhase::Clear => "No Sade Sati or Dhaiya",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SadeSatiInputs {
    pub moon_sign: usize,
    pub date: NaiveDate,
}

impl SadeSatiInputs {
    pub fn from_form(form: &mut FormReader<'_>) -> CalcResult<Self> {
        let sign = form.choice(&MOON_SIGN)?;
        let moon_sign = SIGNS.iter().position(|s| *s == sign).unwrap_or(0);

        let raw_date = form.text(&DATE);
        let date = if raw_date.eq_ignore_ascii_case("today") {
            Local::now().date_naive()
        } else {
            NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d").map_err(|_| {
                CalcError::InvalidDate {
                    field: DATE.key.to_string(),
                    value: raw_date.clone(),
                }
            })?
        };

        Ok(Self { moon_sign, date })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaturnTransit {
    pub sign: &'static str,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SadeSatiPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SadeSatiResult {
    pub moon_sign: &'static str,
    pub date: NaiveDate,
    pub saturn_transit: Option<SaturnTransit>,
    pub saturn_house: Option<u8>,
    pub phase: Option<SaturnPhase>,
    pub days_until_transit_ends: Option<i64>,
    pub next_sade_sati: Option<SadeSatiPeriod>,
    pub periods: Vec<SadeSatiPeriod>,
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn saturn_transits() -> Vec<SaturnTransit> {
    let end_of_table = ymd(EPHEMERIS_END.0, EPHEMERIS_END.1, EPHEMERIS_END.2);
    SATURN_INGRESSES
        .iter()
        .enumerate()
        .filter_map(|(idx, &(sign, year, month, day))| {
            let start = ymd(year, month, day)?;
            let end = match SATURN_INGRESSES.get(idx + 1) {
                Some(&(_, y, m, d)) => ymd(y, m, d)?,
                None => end_of_table?,
            };
            Some(SaturnTransit {
                sign: SIGNS[sign],
                start,
                end,
            })
        })
        .collect()
}

fn house_from_moon(moon_sign: usize, saturn_sign: usize) -> u8 {
    ((saturn_sign + 12 - moon_sign % 12) % 12 + 1) as u8
}

fn sign_index(sign: &str) -> usize {
    SIGNS.iter().position(|s| *s == sign).unwrap_or(0)
}

pub fn sade_sati_periods(moon_sign: usize, transits: &[SaturnTransit]) -> Vec<SadeSatiPeriod> {
    let mut periods: Vec<SadeSatiPeriod> = Vec::new();
    let mut open: Option<SadeSatiPeriod> = None;

    for (idx, transit) in transits.iter().enumerate() {
        let house = house_from_moon(moon_sign, sign_index(transit.sign));
        if SaturnPhase::from_house(house).is_sade_sati() {
            let period = open.get_or_insert(SadeSatiPeriod {
                start: transit.start,
                end: transit.end,
                truncated: idx == 0,
            });
            period.end = transit.end;
            if idx + 1 == transits.len() {
                period.truncated = true;
            }
        } else if let Some(period) = open.take() {
            periods.push(period);
        }
    }
    periods.extend(open);
    periods
}

pub fn calculate(inputs: &SadeSatiInputs) -> SadeSatiResult {
    let transits = saturn_transits();
    let moon_sign = inputs.moon_sign % 12;
    let current = transits
        .iter()
        .copied()
        .find(|t| t.start <= inputs.date && inputs.date < t.end);

    let saturn_house = current.map(|t| house_from_moon(moon_sign, sign_index(t.sign)));
    let phase = saturn_house.map(SaturnPhase::from_house);
    let periods = sade_sati_periods(moon_sign, &transits);
    let next_sade_sati = periods.iter().copied().find(|p| p.start > inputs.date);

    SadeSatiResult {
        moon_sign: SIGNS[moon_sign],
        date: inputs.date,
        saturn_transit: current,
        saturn_house,
        phase,
        days_until_transit_ends: current.map(|t| (t.end - inputs.date).num_days()),
        next_sade_sati,
        periods,
    }
}

impl Report for SadeSatiResult {
    fn metrics(&self) -> Vec<Metric> {
        let mut metrics = Vec::new();
        if let Some(house) = self.saturn_house {
            metrics.push(Metric::number(
                "saturnHouse",
                "Saturn's sign from the moon",
                house as f64,
                0,
            ));
        }
        if let Some(days) = self.days_until_transit_ends {
            metrics.push(
                Metric::number(
                    "daysUntilTransitEnds",
                    "Days until Saturn changes sign",
                    days as f64,
                    0,
                )
                .with_unit("days"),
            );
        }
        if let Some(next) = self.next_sade_sati {
            let days = (next.start - self.date).num_days();
            metrics.push(
                Metric::number(
                    "daysUntilNextSadeSati",
                    "Days until next Sade Sati",
                    days as f64,
                    0,
                )
                .with_unit("days"),
            );
        }
        metrics.push(Metric::number(
            "periodCount",
            "Sade Sati periods in table",
            self.periods.len() as f64,
            0,
        ));
        metrics
    }

    fn classification(&self) -> Option<String> {
        Some(match (self.phase, self.saturn_transit) {
            (Some(phase), Some(transit)) => {
                let sign_label = SIGN_LABELS[sign_index(transit.sign)];
                format!("{} (Saturn in {sign_label})", phase.label())
            }
            _ => "outside ephemeris range".to_string(),
        })
    }
}
