//! Per-unit stages. Every stage has the same shape: it takes its input by
//! value together with the unit's [`TransformContext`], returns a new value,
//! and records anomalies in `ctx.report`.

use anyhow::Result;

use crate::{
    analysis::AnalysisRow,
    common::Warning,
    election::{self, ConsolidatedPrecinctRow, PrecinctTable, RawElectionTable},
    pipeline::TransformContext,
};

/// Number of unmatched precinct ids quoted in a warning.
const UNMATCHED_SAMPLE: usize = 5;

/// Key every row by (precinct, ballot type) using the era's label convention.
pub fn normalize(table: RawElectionTable, ctx: &mut TransformContext<'_>) -> PrecinctTable {
    let descriptive = ctx.descriptive();
    PrecinctTable::Split(election::normalize_index(&table, descriptive, &mut ctx.report))
}

/// One row per precinct.
pub fn consolidate(table: PrecinctTable, ctx: &mut TransformContext<'_>) -> Vec<ConsolidatedPrecinctRow> {
    election::consolidate(table, &mut ctx.report)
}

/// Canonical ids, combined precincts expanded.
pub fn canonicalize(rows: Vec<ConsolidatedPrecinctRow>, ctx: &mut TransformContext<'_>) -> Vec<ConsolidatedPrecinctRow> {
    election::canonicalize(rows, &mut ctx.report)
}

/// Join each precinct with the era's census values and derive the analysis
/// variables. Precincts without census values are dropped and reported.
///
/// Fails when the proposition has no metadata or the era's census table is
/// not loaded.
pub fn join_census(rows: Vec<ConsolidatedPrecinctRow>, ctx: &mut TransformContext<'_>) -> Result<Vec<AnalysisRow>> {
    let nimby = ctx.nimby_vote()?;
    let values = ctx.census_values()?;
    let columns = ctx.columns;

    for column in [&columns.med_income, &columns.med_value, &columns.yr_built, &columns.yr_moved_all, &columns.yr_moved_owner] {
        if !values.has_column(column) {
            ctx.report.warn(Warning::MissingDerivationColumn { column: column.clone() });
        }
    }

    let mut unmatched = Vec::new();
    let joined = rows.iter()
        .filter_map(|result| {
            let row = AnalysisRow::from_values(ctx.date, &ctx.letter, &ctx.route, nimby, result, values, columns);
            if row.is_none() { unmatched.push(result.precinct.clone()) }
            row
        })
        .collect::<Vec<_>>();
    if !unmatched.is_empty() {
        let count = unmatched.len();
        unmatched.truncate(UNMATCHED_SAMPLE);
        ctx.report.warn(Warning::UnmatchedPrecincts { count, sample: unmatched });
    }

    Ok(joined)
}
