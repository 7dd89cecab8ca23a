pub mod aggregate;
pub mod cutoffs;
pub mod electrical;
mod error;
mod evaluator;
pub mod fields;
pub mod format;
pub mod fraction;
pub mod mortgage;
pub mod names;
pub mod options;
pub mod pool_pump;
pub mod sade_sati;
pub mod tax;
pub mod tiers;
pub mod title_insurance;
mod types;
pub mod units;

pub use error::{CalcError, CalcResult};
pub use evaluator::{Evaluation, Tool, ToolInfo, ToolResult, evaluate};
pub use fields::{FieldSpec, FormValues, Substitution, SubstitutionReason};
pub use types::{Metric, Report};
