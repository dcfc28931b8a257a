//! Canonical precinct ids: strip reporting tokens and expand combined precincts.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;

use crate::{
    common::{QualityReport, Warning},
    election::ConsolidatedPrecinctRow,
};

static MAIL_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s*mail\s*|\s*mail\s*$").unwrap());
static PCT_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s*pct\s*|\s*pct\s*$").unwrap());
static COMBINED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}/\d{4}").unwrap());

/// Strip "mail" then "pct" tokens from both ends of a precinct id, then trim.
pub fn canonical_id(id: &str) -> String {
    let id = MAIL_TOKEN.replace_all(id, "");
    let id = PCT_TOKEN.replace_all(&id, "");
    id.trim().to_string()
}

/// Component precinct ids of a combined id such as "1104/1105".
pub fn split_combined(id: &str) -> Option<Vec<String>> {
    if !COMBINED.is_match(id) { return None }
    Some(id.split('/')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect())
}

/// Canonicalize precinct ids and expand combined precincts.
///
/// Each part of a combined row receives an exact copy of the combined row's
/// counts, so raw totals over split precincts are inflated; consumers must
/// use ratios for rows where [`ConsolidatedPrecinctRow::is_split`] holds.
/// Rows whose ids collapse onto the same canonical id (e.g. "PCT 1101" and
/// "PCT 1101 MAIL") are merged with the same rules as ballot-type
/// consolidation. Output is ordered by precinct id.
pub fn canonicalize(rows: Vec<ConsolidatedPrecinctRow>, report: &mut QualityReport) -> Vec<ConsolidatedPrecinctRow> {
    let mut out: BTreeMap<String, ConsolidatedPrecinctRow> = BTreeMap::new();
    let mut combined = Vec::new();

    for mut row in rows {
        let id = canonical_id(&row.precinct);
        if id.is_empty() {
            report.warn(Warning::EmptyPrecinct { original: row.precinct });
            continue;
        }
        row.precinct = id;

        if let Some(parts) = split_combined(&row.precinct) {
            combined.push((row, parts));
            continue;
        }

        match out.get_mut(&row.precinct) {
            Some(existing) => {
                report.warn(Warning::MergedPrecinct { precinct: row.precinct.clone() });
                existing.registered = existing.registered.or(row.registered);
                existing.voted += row.voted;
                existing.yes += row.yes;
                existing.no += row.no;
            }
            None => { out.insert(row.precinct.clone(), row); }
        }
    }

    for (row, parts) in combined {
        for part in parts {
            if out.contains_key(&part) {
                report.warn(Warning::SplitConflict { combined: row.precinct.clone(), precinct: part });
                continue;
            }
            out.insert(part.clone(), ConsolidatedPrecinctRow {
                precinct: part,
                split_from: Some(row.precinct.clone()),
                ..row.clone()
            });
        }
    }

    out.into_values().collect()
}
