use std::{collections::BTreeSet, path::Path};

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use crate::{
    analysis::derive::{adjust_inflation, nimby_share, nimby_total, turnout, years_since, EraDummies},
    census::PrecinctValues,
    config::DerivationColumns,
    election::{ConsolidatedPrecinctRow, NimbyVote},
    era::{BoundaryVintage, ElectionDate, EraRoute},
    io::csv::write_csv,
};

/// Results, census values and derived variables of one precinct for one
/// proposition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRow {
    pub date: ElectionDate,
    pub letter: String,
    pub precinct: String,
    pub registered: Option<u64>,
    pub voted: u64,
    pub yes: u64,
    pub no: u64,
    /// Copied from a combined `####/####` row; raw counts are inflated.
    pub split_precinct: bool,
    pub tot_nimby_votes: u64,
    pub pct_nimby: Option<f64>,
    pub turnout: Option<f64>,
    pub dummies: EraDummies,
    pub census_key: String,
    /// Apportioned census values, in table column order.
    pub census: Vec<(String, Option<f64>)>,
    pub med_hu_age: Option<f64>,
    pub med_yrs_lived: Option<f64>,
    pub med_yrs_lived_owner: Option<f64>,
    pub med_inc_adj: Option<f64>,
    pub med_val_adj: Option<f64>,
}

impl AnalysisRow {
    /// Join one precinct's results with its census values and derive the
    /// analysis variables.
    #[allow(clippy::too_many_arguments)]
    pub fn derive(
        date: ElectionDate,
        letter: &str,
        route: &EraRoute,
        nimby: NimbyVote,
        result: &ConsolidatedPrecinctRow,
        census_columns: &[String],
        census_values: &[Option<f64>],
        columns: &DerivationColumns,
    ) -> Self {
        let census = census_columns.iter().cloned()
            .zip(census_values.iter().copied())
            .collect::<Vec<_>>();
        let value = |name: &str| census.iter().find(|(c, _)| c == name).and_then(|(_, v)| *v);
        let year = date.year();

        Self {
            date,
            letter: letter.to_string(),
            precinct: result.precinct.clone(),
            registered: result.registered,
            voted: result.voted,
            yes: result.yes,
            no: result.no,
            split_precinct: result.is_split(),
            tot_nimby_votes: nimby_total(nimby, result.yes, result.no),
            pct_nimby: nimby_share(nimby, result.yes, result.no),
            turnout: turnout(result.voted, result.registered),
            dummies: EraDummies::new(date, letter),
            census_key: route.census_key(),
            med_hu_age: years_since(year, value(&columns.yr_built)),
            med_yrs_lived: years_since(year, value(&columns.yr_moved_all)),
            med_yrs_lived_owner: years_since(year, value(&columns.yr_moved_owner)),
            med_inc_adj: adjust_inflation(value(&columns.med_income), route.inflation),
            med_val_adj: adjust_inflation(value(&columns.med_value), route.inflation),
            census,
        }
    }

    /// Convenience for callers holding a precinct lookup.
    pub fn from_values(
        date: ElectionDate,
        letter: &str,
        route: &EraRoute,
        nimby: NimbyVote,
        result: &ConsolidatedPrecinctRow,
        values: &PrecinctValues,
        columns: &DerivationColumns,
    ) -> Option<Self> {
        let census = values.get(&result.precinct)?;
        Some(Self::derive(date, letter, route, nimby, result, values.columns(), census, columns))
    }
}

/// The combined analysis table, ordered by (date, proposition, precinct).
#[derive(Debug, Clone, Default)]
pub struct AnalysisTable {
    rows: Vec<AnalysisRow>,
}

impl AnalysisTable {
    pub fn new(mut rows: Vec<AnalysisRow>) -> Self {
        rows.sort_by(|a, b| (a.date, &a.letter, &a.precinct).cmp(&(b.date, &b.letter, &b.precinct)));
        Self { rows }
    }

    #[inline] pub fn rows(&self) -> &[AnalysisRow] { &self.rows }

    #[inline] pub fn len(&self) -> usize { self.rows.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Rows of the elections reported against one precinct boundary set.
    pub fn for_boundary(&self, boundary: BoundaryVintage) -> AnalysisTable {
        AnalysisTable {
            rows: self.rows.iter().filter(|r| boundary.covers(r.date)).cloned().collect(),
        }
    }

    /// Flatten into a data frame. Census columns are the union over all rows
    /// in first-seen order; a row without a column gets null. One `yr_<year>`
    /// indicator column is added per election year present.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let rows = &self.rows;
        let mut columns = vec![
            Column::new("election".into(), rows.iter().map(|r| r.date.to_string()).collect::<Vec<_>>()),
            Column::new("proposal".into(), rows.iter().map(|r| r.letter.as_str()).collect::<Vec<_>>()),
            Column::new("precname".into(), rows.iter().map(|r| r.precinct.as_str()).collect::<Vec<_>>()),
            Column::new("registered".into(), rows.iter().map(|r| r.registered).collect::<Vec<_>>()),
            Column::new("voted".into(), rows.iter().map(|r| r.voted).collect::<Vec<_>>()),
            Column::new("yes".into(), rows.iter().map(|r| r.yes).collect::<Vec<_>>()),
            Column::new("no".into(), rows.iter().map(|r| r.no).collect::<Vec<_>>()),
            Column::new("split_precinct".into(), rows.iter().map(|r| r.split_precinct).collect::<Vec<_>>()),
            Column::new("tot_nimby_votes".into(), rows.iter().map(|r| r.tot_nimby_votes).collect::<Vec<_>>()),
            Column::new("pct_nimby".into(), rows.iter().map(|r| r.pct_nimby).collect::<Vec<_>>()),
            Column::new("turnout".into(), rows.iter().map(|r| r.turnout).collect::<Vec<_>>()),
            Column::new("year".into(), rows.iter().map(|r| u32::from(r.dummies.year)).collect::<Vec<_>>()),
            Column::new("pres_elec".into(), rows.iter().map(|r| r.dummies.pres_elec).collect::<Vec<_>>()),
            Column::new("nov_elec".into(), rows.iter().map(|r| r.dummies.nov_elec).collect::<Vec<_>>()),
            Column::new("yr_prop".into(), rows.iter().map(|r| r.dummies.yr_prop.as_str()).collect::<Vec<_>>()),
        ];

        let years = rows.iter().map(|r| r.dummies.year).collect::<BTreeSet<_>>();
        columns.extend(years.into_iter().map(|year| Column::new(
            format!("yr_{year}").into(),
            rows.iter().map(|r| r.dummies.year == year).collect::<Vec<_>>(),
        )));

        columns.push(Column::new("census_key".into(), rows.iter().map(|r| r.census_key.as_str()).collect::<Vec<_>>()));

        let mut census_names: Vec<&str> = Vec::new();
        for (name, _) in rows.iter().flat_map(|r| r.census.iter()) {
            if !census_names.contains(&name.as_str()) { census_names.push(name) }
        }
        columns.extend(census_names.iter().map(|&name| Column::new(
            name.into(),
            rows.iter()
                .map(|r| r.census.iter().find(|(c, _)| c == name).and_then(|(_, v)| *v))
                .collect::<Vec<_>>(),
        )));

        let derived = |name: &str, get: fn(&AnalysisRow) -> Option<f64>| {
            Column::new(name.into(), rows.iter().map(get).collect::<Vec<_>>())
        };
        columns.push(derived("med_hu_age", |r| r.med_hu_age));
        columns.push(derived("med_yrs_lived", |r| r.med_yrs_lived));
        columns.push(derived("med_yrs_lived_owner", |r| r.med_yrs_lived_owner));
        columns.push(derived("med_inc_adj", |r| r.med_inc_adj));
        columns.push(derived("med_val_adj", |r| r.med_val_adj));

        Ok(DataFrame::new(columns)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        write_csv(&mut self.to_dataframe()?, path)?;
        tracing::info!("[analysis] saved {} rows to {}", self.len(), path.display());
        Ok(())
    }
}
