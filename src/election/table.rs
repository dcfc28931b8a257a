use std::fmt;

use serde::Serialize;

use crate::{common::Error, era::ElectionDate};

/// Names of the four value columns every election table is reduced to.
pub const VALUE_COLUMNS: [&str; 4] = ["registered", "voted", "yes", "no"];

/// Election-day vs. mail-in sub-tally of a precinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BallotType {
    Regular,
    Absentee,
}

impl BallotType {
    /// Single-letter code used by the source workbooks ("V" / "A").
    pub fn code(&self) -> &'static str {
        match self {
            BallotType::Regular => "V",
            BallotType::Absentee => "A",
        }
    }
}

impl fmt::Display for BallotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BallotType::Regular => "REGULAR",
            BallotType::Absentee => "ABSENTEE",
        })
    }
}

/// Row index of a raw sheet, as read from one or two index columns.
#[derive(Debug, Clone, PartialEq)]
pub enum RowLabel {
    /// e.g. "PCT 1101 - Vote By Mail / Absentee Reporting"
    Single(String),
    /// e.g. ("1101", "A") or ("PCT 1101", "Absentee")
    Compound { precinct: String, kind: String },
}

impl fmt::Display for RowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowLabel::Single(label) => f.write_str(label),
            RowLabel::Compound { precinct, kind } => write!(f, "{precinct} / {kind}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub label: RowLabel,
    /// Cells in `VALUE_COLUMNS` order; `None` for empty or non-numeric cells.
    pub values: [Option<f64>; 4],
}

/// One proposition's tally sheet after column selection, before any cleanup.
#[derive(Debug, Clone, PartialEq)]
pub struct RawElectionTable {
    pub date: ElectionDate,
    pub letter: String,
    pub rows: Vec<RawRow>,
}

impl RawElectionTable {
    /// Build a table from rows of arbitrary width, enforcing the four-column layout.
    pub fn from_cells(
        date: ElectionDate,
        letter: &str,
        rows: impl IntoIterator<Item = (RowLabel, Vec<Option<f64>>)>,
    ) -> Result<Self, Error> {
        let rows = rows.into_iter()
            .map(|(label, cells)| {
                let values: [Option<f64>; 4] = cells.try_into()
                    .map_err(|cells: Vec<_>| Error::ValueColumns { expected: VALUE_COLUMNS.len(), found: cells.len() })?;
                Ok(RawRow { label, values })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Self { date, letter: letter.to_string(), rows })
    }

    #[inline] pub fn len(&self) -> usize { self.rows.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}

/// A precinct's tally for one ballot type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPrecinctRow {
    pub precinct: String,
    pub ballot: BallotType,
    pub registered: Option<u64>,
    pub voted: u64,
    pub yes: u64,
    pub no: u64,
}

/// A precinct's tally with regular and absentee ballots combined.
///
/// Rows produced by splitting a combined "####/####" precinct carry the
/// combined id in `split_from`; their counts duplicate the combined row, so
/// only ratios (turnout, vote share) are meaningful for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidatedPrecinctRow {
    pub precinct: String,
    pub registered: Option<u64>,
    pub voted: u64,
    pub yes: u64,
    pub no: u64,
    pub split_from: Option<String>,
}

impl ConsolidatedPrecinctRow {
    #[inline] pub fn is_split(&self) -> bool { self.split_from.is_some() }
}

/// Election results either still keyed by (precinct, ballot type) or already flat.
#[derive(Debug, Clone, PartialEq)]
pub enum PrecinctTable {
    Split(Vec<NormalizedPrecinctRow>),
    Consolidated(Vec<ConsolidatedPrecinctRow>),
}
