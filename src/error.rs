use thiserror::Error;

use crate::period::PeriodPreset;

/// Number of positional columns a campaign export must carry.
pub const EXPECTED_COLUMNS: usize = 15;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("export has no header row")]
    MissingHeader,

    #[error("export has {found} columns, expected at least {expected}")]
    TooFewColumns { expected: usize, found: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown period `{0}` (expected one of: {})", PeriodPreset::names())]
pub struct PeriodParseError(pub String);
