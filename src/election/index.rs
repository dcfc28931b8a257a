//! Reshape a raw sheet's row labels into (precinct, ballot type) keys.

use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;

use crate::{
    common::{QualityReport, Warning},
    era::ElectionDate,
    election::{BallotType, NormalizedPrecinctRow, RawElectionTable, RowLabel, VALUE_COLUMNS},
};

static ABSENTEE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)mail|absent|vbm").unwrap());
static PRECINCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)pct").unwrap());
static SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" - |   ").unwrap());
static MAIL_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)-mail").unwrap());

/// Last election date whose sheets use non-descriptive row labels.
const LAST_NON_DESCRIPTIVE: u32 = 199811;

/// Whether a sheet's labels describe the ballot type ("PCT 1101 - Vote By Mail")
/// or repeat the precinct on both rows ("PCT 2001 8"), leaving the registered
/// count as the only clue.
#[inline]
pub fn is_descriptive(date: ElectionDate) -> bool {
    date.code() > LAST_NON_DESCRIPTIVE
}

/// Ballot type from descriptive label text.
pub fn ballot_type_from_label(label: &str) -> BallotType {
    if ABSENTEE.is_match(label) { BallotType::Absentee } else { BallotType::Regular }
}

/// Ballot type from the registered cell: absentee rows carry no registered count.
pub fn ballot_type_from_registered(registered: Option<f64>) -> Option<BallotType> {
    match registered {
        None => Some(BallotType::Absentee),
        Some(v) if v.is_nan() || v == 0.0 => Some(BallotType::Absentee),
        Some(v) if v > 0.0 => Some(BallotType::Regular),
        Some(_) => None,
    }
}

/// Keep only the precinct part of a label, dropping reporting suffixes such as
/// " - Election Day Reporting". Returns `None` for rows that are not precincts.
pub fn precinct_from_label(label: &str) -> Option<String> {
    if !PRECINCT.is_match(label) { return None }

    let head = if MAIL_SUFFIX.is_match(label) {
        label.split('-').next()
    } else {
        SUFFIX.split(label).next()
    };

    head.map(str::to_string)
}

/// Convert a raw cell to a count. Empty cells are `Ok(None)`; negative or
/// fractional values are errors carrying the offending value.
fn to_count(cell: Option<f64>) -> Result<Option<u64>, f64> {
    match cell {
        None => Ok(None),
        Some(v) if v.is_nan() => Ok(None),
        Some(v) if v >= 0.0 && v.fract() == 0.0 => Ok(Some(v as u64)),
        Some(v) => Err(v),
    }
}

/// Classify every row of `table` and key it by (precinct, ballot type).
///
/// Rows whose label cannot be classified are left out and recorded in
/// `report`; the first row wins when a key repeats.
pub fn normalize_index(
    table: &RawElectionTable,
    descriptive: bool,
    report: &mut QualityReport,
) -> Vec<NormalizedPrecinctRow> {
    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        let key = match &row.label {
            RowLabel::Single(label) => {
                let ballot = if descriptive {
                    Some(ballot_type_from_label(label))
                } else {
                    ballot_type_from_registered(row.values[0])
                };
                ballot.zip(precinct_from_label(label))
                    .map(|(ballot, precinct)| (precinct, ballot))
            }
            RowLabel::Compound { precinct, kind } => {
                let ballot = match kind.trim() {
                    "A" => BallotType::Absentee,
                    "V" => BallotType::Regular,
                    other => ballot_type_from_label(other),
                };
                Some((precinct.trim().to_string(), ballot))
            }
        };

        let Some((precinct, ballot)) = key else {
            report.warn(Warning::LabelMiss { label: row.label.to_string() });
            continue;
        };

        if !seen.insert((precinct.clone(), ballot)) {
            report.warn(Warning::DuplicateKey { precinct, ballot });
            continue;
        }

        let mut counts = [None; 4];
        for (i, cell) in row.values.iter().enumerate() {
            counts[i] = to_count(*cell).unwrap_or_else(|value| {
                report.warn(Warning::InvalidCount {
                    label: row.label.to_string(),
                    column: VALUE_COLUMNS[i].to_string(),
                    value,
                });
                None
            });
        }

        rows.push(NormalizedPrecinctRow {
            precinct,
            ballot,
            registered: counts[0],
            voted: counts[1].unwrap_or(0),
            yes: counts[2].unwrap_or(0),
            no: counts[3].unwrap_or(0),
        });
    }

    rows
}
