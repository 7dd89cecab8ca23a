use serde::Serialize;

use super::format;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub key: &'static str,
    pub label: &'static str,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    pub display: String,
}

impl Metric {
    pub fn number(key: &'static str, label: &'static str, value: f64, decimals: usize) -> Self {
        Self {
            key,
            label,
            value,
            unit: None,
            display: format::grouped(value, decimals),
        }
    }

    pub fn currency(key: &'static str, label: &'static str, value: f64) -> Self {
        Self {
            key,
            label,
            value,
            unit: None,
            display: format::currency(value),
        }
    }

    // `value` is in percent units.
    pub fn percent(key: &'static str, label: &'static str, value: f64, decimals: usize) -> Self {
        Self {
            key,
            label,
            value,
            unit: Some("%"),
            display: format::percent(value, decimals),
        }
    }

    pub fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self.display = format!("{} {unit}", self.display);
        self
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }
}

pub trait Report {
    fn metrics(&self) -> Vec<Metric>;

    fn classification(&self) -> Option<String> {
        None
    }
}
