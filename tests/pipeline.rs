// End-to-end run over in-memory inputs: apportion a census table onto two
// precincts, transform one modern and one 1990s proposition, and check the
// joined analysis rows.

use std::collections::BTreeMap;

use geo::{polygon, MultiPolygon};
use nimbyvote::{
    analyze, apportion, read_apportioned, ApportionTolerance, CensusTable, DerivationColumns,
    Election, ElectionDate, ElectionSet, NimbyVote, PolygonLayer, PrecinctValues, Proposition,
    PropositionTable, QualityReport, RawElectionTable, RowLabel,
};
use polars::prelude::{Column, DataFrame};

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![polygon![
        (x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0),
    ]])
}

fn date(s: &str) -> ElectionDate { s.parse().unwrap() }

/// Two 100 m x 100 m precincts side by side. The first block group covers the
/// left half of precinct 1101; the second covers the rest of 1101 and all of 1102.
fn layers() -> (PolygonLayer, PolygonLayer) {
    let precincts = PolygonLayer::new("pre2012", vec![
        ("1101".to_string(), rect(0.0, 0.0, 100.0, 100.0)),
        ("1102".to_string(), rect(100.0, 0.0, 200.0, 100.0)),
    ]).unwrap();
    let block_groups = PolygonLayer::new("ce2012", vec![
        ("060750101001".to_string(), rect(0.0, 0.0, 50.0, 100.0)),
        ("060750101002".to_string(), rect(50.0, 0.0, 200.0, 100.0)),
    ]).unwrap();
    (precincts, block_groups)
}

fn census() -> CensusTable {
    CensusTable::new(DataFrame::new(vec![
        Column::new("state".into(), &["06", "06"]),
        Column::new("county".into(), &["075", "075"]),
        Column::new("tract".into(), &["010100", "010100"]),
        Column::new("block group".into(), &["1", "2"]),
        Column::new("med_inc".into(), &[40_000.0, 80_000.0]),
        Column::new("med_yr_built".into(), &[1940.0, 1960.0]),
    ]).unwrap()).unwrap()
}

fn cells(values: [f64; 4]) -> Vec<Option<f64>> { values.map(Some).to_vec() }

fn apportioned() -> BTreeMap<String, PrecinctValues> {
    let (precincts, block_groups) = layers();
    let mut report = QualityReport::new();
    let variables = vec!["med_inc".to_string(), "med_yr_built".to_string()];
    let result = apportion(&precincts, &block_groups, &census(), &variables, ApportionTolerance::default(), &mut report)
        .unwrap();
    assert!(result.violations().is_empty());

    let values = result.values().unwrap();
    ["ce2000pre1992", "ce2012pre2012"].into_iter().map(|k| (k.to_string(), values.clone())).collect()
}

#[test]
fn apportioned_values_are_area_weighted() {
    let census = apportioned();
    let values = &census["ce2012pre2012"];
    let med_inc = values.columns().iter().position(|c| c == "med_inc").unwrap();

    // 1101: half in each group; 1102: entirely in the second.
    let a = values.get("1101").unwrap()[med_inc].unwrap();
    let b = values.get("1102").unwrap()[med_inc].unwrap();
    assert!((a - 60_000.0).abs() < 1e-6, "{a}");
    assert!((b - 80_000.0).abs() < 1e-6, "{b}");
}

#[test]
fn full_run_joins_results_with_census() {
    let modern = RawElectionTable::from_cells(date("201511"), "D", vec![
        (RowLabel::Single("PCT 1101 - Election Day".into()), cells([400.0, 150.0, 50.0, 100.0])),
        (RowLabel::Single("PCT 1101 - Vote by Mail".into()), cells([400.0, 50.0, 30.0, 20.0])),
        (RowLabel::Single("PCT 1102 - Election Day".into()), cells([300.0, 100.0, 80.0, 20.0])),
    ]).unwrap();

    // Two-level index, forward-filled by the workbook reader.
    let old = RawElectionTable::from_cells(date("199811"), "E", vec![
        (RowLabel::Compound { precinct: "1101".into(), kind: "V".into() }, cells([500.0, 200.0, 90.0, 110.0])),
        (RowLabel::Compound { precinct: "1101".into(), kind: "A".into() }, cells([0.0, 40.0, 10.0, 30.0])),
    ]).unwrap();

    let mut propositions = PropositionTable::new();
    propositions.insert(date("201511"), "D", NimbyVote::No);
    propositions.insert(date("199811"), "E", NimbyVote::Yes);

    let elections = ElectionSet::new(vec![
        Election { date: date("201511"), propositions: vec![Proposition { letter: "D".into(), table: modern }] },
        Election { date: date("199811"), propositions: vec![Proposition { letter: "E".into(), table: old }] },
    ]);

    let run = analyze(elections, Vec::new(), &propositions, &apportioned(), &DerivationColumns::default());
    assert_eq!(run.summary.failed(), 0);
    assert_eq!(run.table.len(), 3);

    let rows = run.table.rows();
    let old_row = &rows[0];
    assert_eq!((old_row.date, old_row.precinct.as_str()), (date("199811"), "1101"));
    assert_eq!(old_row.registered, Some(500));
    assert_eq!((old_row.voted, old_row.yes, old_row.no), (240, 100, 140));
    assert_eq!(old_row.tot_nimby_votes, 100);
    assert!((old_row.med_inc_adj.unwrap() - 60_000.0 * 1.42).abs() < 1e-6);
    assert_eq!(old_row.census_key, "ce2000pre1992");

    let modern_row = &rows[1];
    assert_eq!(modern_row.precinct, "1101");
    assert_eq!(modern_row.turnout, Some(0.5));
    assert_eq!(modern_row.pct_nimby, Some(0.6));
    assert!((modern_row.med_hu_age.unwrap() - (2015.0 - 1950.0)).abs() < 1e-6);

    let totals = run.totals.iter().map(|t| (t.letter.as_str(), t.yes, t.no)).collect::<Vec<_>>();
    assert_eq!(totals, vec![("E", 100, 140), ("D", 160, 140)]);

    let df = run.table.to_dataframe().unwrap();
    assert_eq!(df.height(), 3);
    assert!(df.column("yr_1998").is_ok() && df.column("yr_2015").is_ok());
}

#[test]
fn outputs_round_trip_through_the_output_directory() {
    let (precincts, block_groups) = layers();
    let mut report = QualityReport::new();
    let result = apportion(&precincts, &block_groups, &census(), &["med_inc".to_string()],
        ApportionTolerance::default(), &mut report).unwrap();

    let tmp = tempfile::tempdir().unwrap();
    result.write(tmp.path(), "ce2012pre2012").unwrap();

    let tables = read_apportioned(tmp.path()).unwrap();
    let values = &tables["ce2012pre2012"];
    assert_eq!(values.len(), 2);
    assert!(values.has_column("med_inc") && values.has_column("prop_area"));
}
