use thiserror::Error;

use crate::era::ElectionDate;

/// Structural failures of a single election/proposition unit.
///
/// These abort the affected unit only; the batch continues.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid election date {0:?}, expected six digits YYYYMM")]
    InvalidDate(String),

    #[error("expected {expected} value columns (registered, voted, yes, no), found {found}")]
    ValueColumns { expected: usize, found: usize },

    #[error("no proposition metadata for {date} {letter}")]
    UnknownProposition { date: ElectionDate, letter: String },

    #[error("invalid NIMBY vote {0:?}, expected YES or NO")]
    InvalidNimbyVote(String),

    #[error("missing column {0:?}")]
    MissingColumn(String),

    #[error("no sheet named {sheet:?} in workbook {workbook}")]
    SheetNotFound { workbook: String, sheet: String },

    #[error("layer {0:?} has no usable polygons")]
    EmptyLayer(String),
}
