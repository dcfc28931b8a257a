use anyhow::Result;
use polars::{frame::DataFrame, prelude::Column};

use crate::{era::ElectionDate, election::ConsolidatedPrecinctRow};

/// Citywide yes share of one proposition, for comparison with the official canvass.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteTotal {
    pub date: ElectionDate,
    pub letter: String,
    pub yes: u64,
    pub no: u64,
    pub yes_pct: Option<f64>,
}

impl VoteTotal {
    /// Sum a proposition's rows. Expects rows before combined precincts are
    /// split, otherwise the duplicated rows would be counted twice.
    pub fn from_rows(date: ElectionDate, letter: &str, rows: &[ConsolidatedPrecinctRow]) -> Self {
        let yes: u64 = rows.iter().map(|row| row.yes).sum();
        let no: u64 = rows.iter().map(|row| row.no).sum();
        let yes_pct = (yes + no > 0).then(|| yes as f64 / (yes + no) as f64);
        Self { date, letter: letter.to_string(), yes, no, yes_pct }
    }
}

/// Verification report: one row per (election, proposition).
pub fn vote_totals_dataframe(totals: &[VoteTotal]) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        Column::new("election".into(), totals.iter().map(|t| t.date.to_string()).collect::<Vec<_>>()),
        Column::new("proposal".into(), totals.iter().map(|t| t.letter.clone()).collect::<Vec<_>>()),
        Column::new("yes".into(), totals.iter().map(|t| t.yes).collect::<Vec<_>>()),
        Column::new("no".into(), totals.iter().map(|t| t.no).collect::<Vec<_>>()),
        Column::new("yes_pct".into(), totals.iter().map(|t| t.yes_pct).collect::<Vec<_>>()),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(precinct: &str, yes: u64, no: u64) -> ConsolidatedPrecinctRow {
        ConsolidatedPrecinctRow { precinct: precinct.into(), registered: Some(100), voted: yes + no, yes, no, split_from: None }
    }

    #[test]
    fn yes_share_over_all_precincts() {
        let date = "201511".parse().unwrap();
        let total = VoteTotal::from_rows(date, "D", &[row("1101", 30, 10), row("1102", 30, 30)]);
        assert_eq!((total.yes, total.no), (60, 40));
        assert_eq!(total.yes_pct, Some(0.6));
    }

    #[test]
    fn empty_proposition_has_undefined_share() {
        let total = VoteTotal::from_rows("201511".parse().unwrap(), "D", &[]);
        assert_eq!(total.yes_pct, None);
    }

    #[test]
    fn report_has_one_row_per_proposition() {
        let date = "201511".parse().unwrap();
        let totals = vec![
            VoteTotal::from_rows(date, "D", &[row("1101", 3, 1)]),
            VoteTotal::from_rows(date, "I", &[row("1101", 1, 3)]),
        ];
        let df = vote_totals_dataframe(&totals).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("yes_pct").unwrap().f64().unwrap().get(1), Some(0.25));
    }
}
