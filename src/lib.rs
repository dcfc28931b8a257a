#![doc = "nimbyvote public API"]
mod analysis;
mod census;
mod common;
mod config;
mod election;
mod era;
mod geom;
mod io;
mod pipeline;

#[doc(inline)]
pub use common::{Error, QualityReport, Warning};

#[doc(inline)]
pub use era::{
    census_key, is_november, is_presidential, route, route_str, BoundaryVintage, CensusVintage,
    ElectionDate, EraRoute, PAIRINGS,
};

#[doc(inline)]
pub use config::{
    ApportionTolerance, CensusSource, DerivationColumns, ElectionSource, LayerSource, PipelineConfig,
    SheetOverride, SheetParamTable, SheetParams,
};

#[doc(inline)]
pub use geom::{Geometries, Overlap, Reprojection, NAD83_LONLAT, NAD83_UTM10N};

#[doc(inline)]
pub use election::{
    ballot_type_from_label, ballot_type_from_registered, canonical_id, canonicalize, consolidate,
    is_descriptive, normalize_index, precinct_from_label, split_combined, vote_totals_dataframe,
    BallotType, ConsolidatedPrecinctRow, NimbyVote, NormalizedPrecinctRow, PrecinctTable,
    PropositionTable, RawElectionTable, RawRow, RowLabel, VoteTotal, VALUE_COLUMNS,
};

#[doc(inline)]
pub use census::{
    apportion, read_variables, selected_variables, Apportionment, CensusTable, PolygonLayer,
    PrecinctValues, COVERAGE_COL, GEOID_COL, PRECINCT_COL,
};

#[doc(inline)]
pub use analysis::{
    adjust_inflation, nimby_share, nimby_total, turnout, years_since, AnalysisRow, AnalysisTable,
    EraDummies,
};

#[doc(inline)]
pub use pipeline::{
    analyze, apportion_all, load_propositions, read_apportioned, transform_unit, AnalysisRun,
    Election, ElectionSet, LoadFailure, Proposition, RunSummary, TransformContext, UnitOutput,
    UnitSummary,
};

#[doc(inline)]
pub use pipeline::stage;

/// List the sheets of a workbook whose names match `pattern` and not `exclude`
/// (both case-insensitive).
pub fn find_sheets(workbook: &std::path::Path, pattern: &str, exclude: Option<&str>) -> anyhow::Result<Vec<String>> {
    io::workbook::matching_sheets(&io::workbook::sheet_names(workbook)?, pattern, exclude)
}
