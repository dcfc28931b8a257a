use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    analysis::{AnalysisRow, AnalysisTable},
    census::PrecinctValues,
    common::{ensure_dir_exists, QualityReport, Warning},
    config::DerivationColumns,
    election::{vote_totals_dataframe, PropositionTable, RawElectionTable, VoteTotal},
    era::{BoundaryVintage, ElectionDate},
    io::csv::{read_csv_with_text_columns, write_csv},
    pipeline::{stage, ElectionSet, LoadFailure, TransformContext},
};

/// Result of transforming one (election, proposition) unit.
#[derive(Debug, Clone)]
pub struct UnitOutput {
    pub total: VoteTotal,
    pub rows: Vec<AnalysisRow>,
    pub report: QualityReport,
}

/// Run one unit through every stage: normalize the index, consolidate
/// absentee rows, total the votes, canonicalize precinct ids, then join the
/// era's apportioned census values and derive the analysis variables.
pub fn transform_unit(
    table: RawElectionTable,
    propositions: &PropositionTable,
    census: &BTreeMap<String, PrecinctValues>,
    columns: &DerivationColumns,
) -> Result<UnitOutput> {
    let mut ctx = TransformContext::new(table.date, &table.letter, propositions, census, columns);

    let normalized = stage::normalize(table, &mut ctx);
    let consolidated = stage::consolidate(normalized, &mut ctx);
    let total = VoteTotal::from_rows(ctx.date, &ctx.letter, &consolidated);
    let precincts = stage::canonicalize(consolidated, &mut ctx);
    let count = precincts.len();
    let rows = stage::join_census(precincts, &mut ctx)?;

    tracing::info!("[pipeline] {} {}: {count} precincts, {} joined with {}", ctx.date, ctx.letter, rows.len(), ctx.route.census_key());
    Ok(UnitOutput { total, rows, report: ctx.report })
}

/// Outcome of one unit in the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct UnitSummary {
    pub date: ElectionDate,
    pub letter: String,
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub warnings: Vec<Warning>,
}

/// Per-unit outcomes and warnings of a run, persisted as JSON.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub units: Vec<UnitSummary>,
    /// Warnings raised outside any unit, e.g. while apportioning.
    pub warnings: Vec<Warning>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.units.iter().filter(|u| u.error.is_some()).count()
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("[pipeline] Failed to write {}", path.display()))
    }
}

/// Output of the analysis stage.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRun {
    pub table: AnalysisTable,
    pub totals: Vec<VoteTotal>,
    pub summary: RunSummary,
}

impl AnalysisRun {
    /// Write `analysis.csv`, one `analysis_<boundary>.csv` per boundary set
    /// with rows, `vote_totals.csv` and `run_summary.json` into `dir`.
    pub fn write(&self, dir: &Path) -> Result<()> {
        ensure_dir_exists(dir)?;
        self.table.write(&dir.join("analysis.csv"))?;
        for boundary in BoundaryVintage::ALL {
            let subset = self.table.for_boundary(boundary);
            if !subset.is_empty() {
                subset.write(&dir.join(format!("analysis_{boundary}.csv")))?;
            }
        }
        write_csv(&mut vote_totals_dataframe(&self.totals)?, &dir.join("vote_totals.csv"))?;
        self.summary.write(&dir.join("run_summary.json"))
    }
}

/// Transform every unit in parallel. A unit that fails is recorded in the
/// summary and left out of the table; the others are unaffected.
pub fn analyze(
    elections: ElectionSet,
    load_failures: Vec<LoadFailure>,
    propositions: &PropositionTable,
    census: &BTreeMap<String, PrecinctValues>,
    columns: &DerivationColumns,
) -> AnalysisRun {
    let outcomes = elections.into_tables().into_par_iter()
        .map(|table| {
            let (date, letter) = (table.date, table.letter.clone());
            (date, letter, transform_unit(table, propositions, census, columns))
        })
        .collect::<Vec<_>>();

    let mut summary = RunSummary::default();
    let mut rows = Vec::new();
    let mut totals = Vec::new();

    for failure in load_failures {
        summary.units.push(UnitSummary {
            date: failure.date,
            letter: failure.letter,
            rows: 0,
            error: Some(failure.error),
            warnings: Vec::new(),
        });
    }
    for (date, letter, outcome) in outcomes {
        match outcome {
            Ok(output) => {
                summary.units.push(UnitSummary {
                    date,
                    letter,
                    rows: output.rows.len(),
                    error: None,
                    warnings: output.report.warnings().to_vec(),
                });
                totals.push(output.total);
                rows.extend(output.rows);
            }
            Err(e) => {
                tracing::error!("[pipeline] {date} {letter} failed: {e:#}");
                summary.units.push(UnitSummary { date, letter, rows: 0, error: Some(format!("{e:#}")), warnings: Vec::new() });
            }
        }
    }
    summary.units.sort_by(|a, b| (a.date, &a.letter).cmp(&(b.date, &b.letter)));

    AnalysisRun { table: AnalysisTable::new(rows), totals, summary }
}

/// Load the proposition metadata CSV.
pub fn load_propositions(path: &Path) -> Result<PropositionTable> {
    let df = read_csv_with_text_columns(path, &[PropositionTable::DATE_COL, PropositionTable::LETTER_COL])?;
    PropositionTable::from_dataframe(&df)
        .with_context(|| format!("[pipeline] Invalid proposition metadata {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        census::{COVERAGE_COL, PRECINCT_COL},
        common::Error,
        election::{NimbyVote, RowLabel},
    };
    use polars::prelude::{Column, DataFrame};

    fn census() -> BTreeMap<String, PrecinctValues> {
        let df = DataFrame::new(vec![
            Column::new(PRECINCT_COL.into(), &["1101", "1102", "2201"]),
            Column::new(COVERAGE_COL.into(), &[1.0, 0.99, 1.02]),
            Column::new("med_inc".into(), &[40_000.0, 60_000.0, 80_000.0]),
        ]).unwrap();
        let values = PrecinctValues::from_dataframe(&df).unwrap();
        ["ce2000pre1992", "ce2012pre2012"].into_iter().map(|k| (k.to_string(), values.clone())).collect()
    }

    fn cells(values: [f64; 4]) -> Vec<Option<f64>> { values.map(Some).to_vec() }

    fn table(date: &str, letter: &str, rows: Vec<(RowLabel, Vec<Option<f64>>)>) -> RawElectionTable {
        RawElectionTable::from_cells(date.parse().unwrap(), letter, rows).unwrap()
    }

    fn propositions() -> PropositionTable {
        let mut props = PropositionTable::new();
        props.insert("199811".parse().unwrap(), "E", NimbyVote::Yes);
        props.insert("201511".parse().unwrap(), "D", NimbyVote::No);
        props.insert("199111".parse().unwrap(), "K", NimbyVote::No);
        props
    }

    #[test]
    fn unit_runs_every_stage() {
        let raw = table("201511", "D", vec![
            (RowLabel::Single("PCT 1101 - Election Day".into()), cells([500.0, 200.0, 120.0, 80.0])),
            (RowLabel::Single("PCT 1101 - Vote by Mail".into()), cells([500.0, 100.0, 40.0, 60.0])),
            (RowLabel::Single("PCT 1102/2201 - Election Day".into()), cells([300.0, 100.0, 50.0, 50.0])),
            (RowLabel::Single("Grand Total".into()), cells([1300.0, 400.0, 210.0, 190.0])),
        ]);

        let output = transform_unit(raw, &propositions(), &census(), &DerivationColumns::default()).unwrap();

        assert_eq!((output.total.yes, output.total.no), (210, 190));
        let ids = output.rows.iter().map(|r| r.precinct.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["1101", "1102", "2201"]);

        let first = &output.rows[0];
        assert_eq!(first.registered, Some(500));
        assert_eq!((first.voted, first.yes, first.no), (300, 160, 140));
        assert_eq!(first.tot_nimby_votes, 140);
        assert!(!first.split_precinct && output.rows[1].split_precinct);

        // "Grand Total" is not a precinct row; the census table has no housing columns.
        assert!(output.report.warnings().contains(&Warning::LabelMiss { label: "Grand Total".into() }));
        assert!(output.report.warnings().contains(&Warning::MissingDerivationColumn { column: "med_yr_built".into() }));
    }

    #[test]
    fn failing_units_do_not_stop_the_batch() {
        let ok = table("199811", "E", vec![
            (RowLabel::Single("PCT 1101".into()), cells([500.0, 200.0, 120.0, 80.0])),
            (RowLabel::Single("PCT 1101 MAIL".into()), cells([0.0, 50.0, 20.0, 30.0])),
            (RowLabel::Single("PCT 9999".into()), cells([10.0, 5.0, 3.0, 2.0])),
        ]);
        let unknown = table("201511", "Z", vec![]);
        let early = table("199111", "K", vec![
            (RowLabel::Single("PCT 1102".into()), cells([300.0, 100.0, 70.0, 30.0])),
        ]);
        let elections = ElectionSet::new(vec![
            crate::pipeline::Election {
                date: ok.date,
                propositions: vec![crate::pipeline::Proposition { letter: "E".into(), table: ok }],
            },
            crate::pipeline::Election {
                date: unknown.date,
                propositions: vec![crate::pipeline::Proposition { letter: "Z".into(), table: unknown }],
            },
            crate::pipeline::Election {
                date: early.date,
                propositions: vec![crate::pipeline::Proposition { letter: "K".into(), table: early }],
            },
        ]);

        let run = analyze(elections, Vec::new(), &propositions(), &census(), &DerivationColumns::default());

        assert_eq!(run.summary.units.len(), 3);
        assert_eq!(run.summary.failed(), 1);
        assert_eq!(run.table.len(), 2);
        assert_eq!(run.totals.len(), 2);

        // Elections before 1992 fall in the oldest era.
        let early = &run.table.rows()[0];
        assert_eq!((early.precinct.as_str(), early.census_key.as_str()), ("1102", "ce2000pre1992"));
        assert_eq!(early.tot_nimby_votes, 30);

        let row = &run.table.rows()[1];
        assert_eq!((row.voted, row.yes, row.no, row.registered), (250, 140, 110, Some(500)));
        assert_eq!(row.tot_nimby_votes, 140);

        let ok_unit = &run.summary.units[1];
        assert!(ok_unit.warnings.contains(&Warning::UnmatchedPrecincts { count: 1, sample: vec!["9999".into()] }));

        let unknown = &run.summary.units[2];
        let expected = Error::UnknownProposition { date: unknown.date, letter: "Z".into() };
        assert_eq!(unknown.error.as_deref(), Some(expected.to_string().as_str()));
    }

    #[test]
    fn run_outputs_are_written() {
        let raw = table("201511", "D", vec![
            (RowLabel::Single("PCT 1101 - Election Day".into()), cells([500.0, 200.0, 120.0, 80.0])),
        ]);
        let elections = ElectionSet::new(vec![crate::pipeline::Election {
            date: raw.date,
            propositions: vec![crate::pipeline::Proposition { letter: "D".into(), table: raw }],
        }]);
        let run = analyze(elections, Vec::new(), &propositions(), &census(), &DerivationColumns::default());

        let tmp = tempfile::tempdir().unwrap();
        run.write(tmp.path()).unwrap();
        for name in ["analysis.csv", "analysis_pre2012.csv", "vote_totals.csv", "run_summary.json"] {
            assert!(tmp.path().join(name).exists(), "{name}");
        }
        assert!(!tmp.path().join("analysis_pre1992.csv").exists());

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(tmp.path().join("run_summary.json")).unwrap()).unwrap();
        assert_eq!(summary["units"][0]["date"], "201511");
    }

    #[test]
    fn propositions_load_from_csv() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("proposals.csv");
        fs::write(&path, "Date_str,Letter,Vote that equals NIMBY\n199811,E,YES\n201511,D,NO\n201511,I,\n").unwrap();

        let props = load_propositions(&path).unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(props.nimby_vote("201511".parse().unwrap(), "D"), Ok(NimbyVote::No));
    }
}
