use std::fmt;

use serde::Serialize;

use crate::election::BallotType;

/// A data-quality anomaly that was recorded and skipped rather than raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Row label matched neither a precinct marker nor a ballot-type rule.
    LabelMiss { label: String },
    /// A (precinct, ballot type) key appeared more than once; the first row was kept.
    DuplicateKey { precinct: String, ballot: BallotType },
    /// A count cell held a value that is not a non-negative number.
    InvalidCount { label: String, column: String, value: f64 },
    /// Precinct reported only an absentee row, so it has no registered count.
    AbsenteeOnly { precinct: String },
    /// Precinct id was empty once the mail/pct tokens were stripped.
    EmptyPrecinct { original: String },
    /// Two rows collapsed onto one canonical id and were summed.
    MergedPrecinct { precinct: String },
    /// A combined precinct expanded onto an id that already had its own row.
    SplitConflict { combined: String, precinct: String },
    /// Shapes without geometry were dropped while loading a layer.
    MissingGeometry { layer: String, count: usize },
    /// Block groups overlapping precincts have no row in the census table.
    MissingCensusRows { layer: String, geoids: Vec<String> },
    /// Sum of fragment-area fractions fell outside the tolerance band.
    CoverageOutOfRange { layer: String, precincts: Vec<String> },
    /// Election precincts with no apportioned census row.
    UnmatchedPrecincts { count: usize, sample: Vec<String> },
    /// A census column needed by a derived variable is absent.
    MissingDerivationColumn { column: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::LabelMiss { label } =>
                write!(f, "row {label:?} is not a precinct row, skipped"),
            Warning::DuplicateKey { precinct, ballot } =>
                write!(f, "duplicate row for precinct {precinct} ({ballot}), kept the first"),
            Warning::InvalidCount { label, column, value } =>
                write!(f, "row {label:?} has invalid {column} count {value}, treated as missing"),
            Warning::AbsenteeOnly { precinct } =>
                write!(f, "precinct {precinct} has only an absentee row, registered is undefined"),
            Warning::EmptyPrecinct { original } =>
                write!(f, "precinct id {original:?} is empty after canonicalization, dropped"),
            Warning::MergedPrecinct { precinct } =>
                write!(f, "several rows canonicalize to precinct {precinct}, counts summed"),
            Warning::SplitConflict { combined, precinct } =>
                write!(f, "combined precinct {combined} overlaps existing row {precinct}, kept the existing row"),
            Warning::MissingGeometry { layer, count } =>
                write!(f, "omitted {count} shape(s) with missing geometry from {layer}"),
            Warning::MissingCensusRows { layer, geoids } =>
                write!(f, "{} block group(s) of {layer} have no census row and contribute nothing: {}", geoids.len(), geoids.join(", ")),
            Warning::CoverageOutOfRange { layer, precincts } =>
                write!(f, "{} precinct(s) in {layer} have area coverage outside tolerance: {}", precincts.len(), precincts.join(", ")),
            Warning::UnmatchedPrecincts { count, sample } =>
                write!(f, "{count} precinct(s) have no census match (e.g. {})", sample.join(", ")),
            Warning::MissingDerivationColumn { column } =>
                write!(f, "census column {column:?} is missing, dependent variables are undefined"),
        }
    }
}

/// Collects the warnings raised while processing one unit of work.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualityReport {
    warnings: Vec<Warning>,
}

impl QualityReport {
    pub fn new() -> Self { Self::default() }

    /// Record a warning and emit it through the tracing subscriber.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Absorb the warnings of another report without logging them again.
    pub fn extend(&mut self, other: QualityReport) {
        self.warnings.extend(other.warnings);
    }

    #[inline] pub fn len(&self) -> usize { self.warnings.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.warnings.is_empty() }

    #[inline] pub fn warnings(&self) -> &[Warning] { &self.warnings }
}
