use serde::Serialize;

use super::error::CalcResult;
use super::fields::{ChoiceField, FieldSpec, FormReader, NumberField, TextField};
use super::types::{Metric, Report};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameStyle {
    Business,
    Brand,
    Fantasy,
}

impl NameStyle {
    fn from_option(option: &str) -> Self {
        match option {
            "brand" => NameStyle::Brand,
            "fantasy" => NameStyle::Fantasy,
            _ => NameStyle::Business,
        }
    }

    fn prefixes(self) -> &'static [&'static str] {
        match self {
            NameStyle::Business => &BUSINESS_PREFIXES,
            NameStyle::Brand => &BRAND_PREFIXES,
            NameStyle::Fantasy => &FANTASY_PREFIXES,
        }
    }

    fn suffixes(self) -> &'static [&'static str] {
        match self {
            NameStyle::Business => &BUSINESS_SUFFIXES,
            NameStyle::Brand => &BRAND_SUFFIXES,
            NameStyle::Fantasy => &FANTASY_SUFFIXES,
        }
    }

    fn separated(self) -> bool {
        matches!(self, NameStyle::Business)
    }
}

const BUSINESS_PREFIXES: [&str; 8] = [
    "Prime", "Summit", "Apex", "Pioneer", "United", "Keystone", "Harbor", "Atlas",
];
const BUSINESS_SUFFIXES: [&str; 10] = [
    "Group",
    "Partners",
    "Solutions",
    "Works",
    "Labs",
    "Co.",
    "Holdings",
    "Consulting",
    "Systems",
    "Collective",
];
const BRAND_PREFIXES: [&str; 8] = ["Go", "My", "Hey", "Re", "Ever", "True", "Bright", "Neo"];
const BRAND_SUFFIXES: [&str; 10] = [
    "ly", "ify", "io", "hub", "nest", "able", "sy", "wise", "loop", "base",
];
const FANTASY_PREFIXES: [&str; 8] = [
    "Eld", "Thal", "Myr", "Vor", "Ael", "Drak", "Syl", "Mor",
];
const FANTASY_SUFFIXES: [&str; 10] = [
    "heim", "dor", "wyn", "gard", "mere", "thas", "ion", "vale", "rith", "oth",
];

pub const MAX_NAMES: usize = 50;

pub const KEYWORD: TextField = TextField::new("keyword", "Keyword", "nova");
pub const STYLE: ChoiceField = ChoiceField::new(
    "style",
    "Style",
    &["business", "brand", "fantasy"],
    "business",
);
pub const COUNT: NumberField = NumberField::new("count", "How many names", 10.0).range(1.0, 50.0);
pub const SEED: NumberField =
    NumberField::new("seed", "Seed (0 = from keyword)", 0.0).range(0.0, 4_294_967_295.0);

pub const FIELDS: [FieldSpec; 4] = [
    FieldSpec::Text(KEYWORD),
    FieldSpec::Choice(STYLE),
    FieldSpec::Number(COUNT),
    FieldSpec::Number(SEED),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameInputs {
    pub keyword: String,
    pub style: NameStyle,
    pub count: usize,
    pub seed: u64,
}

impl NameInputs {
    pub fn from_form(form: &mut FormReader<'_>) -> CalcResult<Self> {
        Ok(Self {
            keyword: form.text(&KEYWORD),
            style: NameStyle::from_option(form.choice(&STYLE)?),
            count: form.number(&COUNT).round() as usize,
            seed: form.number(&SEED).trunc() as u64,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameResult {
    pub style: NameStyle,
    pub seed: u64,
    pub candidates: usize,
    pub names: Vec<String>,
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        let state = if seed == 0 {
            0xA5A5_A5A5_A5A5_A5A5
        } else {
            seed
        };
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }
}

fn keyword_seed(keyword: &str) -> u64 {
    keyword
        .to_lowercase()
        .bytes()
        .fold(0x5EED_u64, |acc, b| splitmix64(acc ^ b as u64))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn candidates(keyword: &str, style: NameStyle) -> Vec<String> {
    let stem = capitalize(keyword);
    let lower = stem.to_lowercase();
    let mut names = Vec::new();

    for prefix in style.prefixes() {
        names.push(if style.separated() {
            format!("{prefix} {stem}")
        } else {
            format!("{prefix}{lower}")
        });
    }
    for suffix in style.suffixes() {
        names.push(if style.separated() {
            format!("{stem} {suffix}")
        } else {
            format!("{stem}{suffix}")
        });
    }
    names.dedup();
    names
}

pub fn generate(inputs: &NameInputs) -> NameResult {
    let keyword = inputs.keyword.trim();
    let seed = if inputs.seed == 0 {
        keyword_seed(keyword)
    } else {
        splitmix64(inputs.seed)
    };

    let mut names = candidates(keyword, inputs.style);
    let candidate_count = names.len();

    let mut rng = Rng::new(seed);
    for i in (1..names.len()).rev() {
        let j = rng.below(i + 1);
        names.swap(i, j);
    }
    names.truncate(inputs.count.clamp(1, MAX_NAMES));

    NameResult {
        style: inputs.style,
        seed,
        candidates: candidate_count,
        names,
    }
}

impl Report for NameResult {
    fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::number("generated", "Names generated", self.names.len() as f64, 0),
            Metric::number("candidates", "Candidates", self.candidates as f64, 0),
            Metric::number("names", "Names", self.names.len() as f64, 0)
                .with_display(self.names.join(", ")),
        ]
    }
}
