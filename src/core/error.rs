pub type CalcResult<T> = Result<T, CalcError>;

// Failures a calculator can report. Numeric fields never fail: bad numbers
// are replaced by the field default and recorded as a substitution instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("{field}: unknown option {value:?} (expected one of: {})", allowed.join(", "))]
    UnknownOption {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("{field}: {reason}")]
    OutOfRange { field: String, reason: String },

    #[error("{field}: invalid date {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { field: String, value: String },
}

impl CalcError {
    pub fn out_of_range(field: &str, reason: impl Into<String>) -> Self {
        CalcError::OutOfRange {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
