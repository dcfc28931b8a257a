use std::collections::BTreeMap;

use crate::{
    common::{QualityReport, Warning},
    election::{BallotType, ConsolidatedPrecinctRow, NormalizedPrecinctRow, PrecinctTable},
};

/// Collapse regular and absentee rows into one row per precinct.
///
/// `voted`, `yes` and `no` are summed. `registered` comes from the regular
/// row alone: several workbooks repeat the full registered count on the
/// absentee row, so a sum would double it. A precinct reporting only an
/// absentee row keeps `registered = None` and is flagged in `report`.
///
/// Already-consolidated tables are returned unchanged. Output is ordered by
/// precinct id.
pub fn consolidate(table: PrecinctTable, report: &mut QualityReport) -> Vec<ConsolidatedPrecinctRow> {
    let rows = match table {
        PrecinctTable::Consolidated(rows) => return rows,
        PrecinctTable::Split(rows) => rows,
    };

    let mut groups: BTreeMap<String, Vec<NormalizedPrecinctRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.precinct.clone()).or_default().push(row);
    }

    groups.into_iter()
        .map(|(precinct, parts)| {
            let regular = parts.iter().find(|row| row.ballot == BallotType::Regular);
            if regular.is_none() {
                report.warn(Warning::AbsenteeOnly { precinct: precinct.clone() });
            }

            ConsolidatedPrecinctRow {
                registered: regular.and_then(|row| row.registered),
                voted: parts.iter().map(|row| row.voted).sum(),
                yes: parts.iter().map(|row| row.yes).sum(),
                no: parts.iter().map(|row| row.no).sum(),
                split_from: None,
                precinct,
            }
        })
        .collect()
}
