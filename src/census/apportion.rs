use std::{iter::once, path::{Path, PathBuf}};

use ahash::{AHashMap, AHashSet};
use anyhow::{Context, Result};
use polars::prelude::*;

use crate::{
    census::{CensusTable, PolygonLayer, GEOID_COL},
    common::{Error, QualityReport, Warning},
    config::ApportionTolerance,
    io::csv::write_csv,
};

/// Precinct id column of apportioned tables.
pub const PRECINCT_COL: &str = "precname";

/// Sum of fragment-area fractions per precinct.
pub const COVERAGE_COL: &str = "prop_area";

const FRACTION_COL: &str = "fraction";

/// Census values area-weighted onto precincts.
#[derive(Debug, Clone)]
pub struct Apportionment {
    data: DataFrame,
    violations: Vec<String>,
}

impl Apportionment {
    /// `precname`, `prop_area` and one column per variable, sorted by precinct.
    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    /// Precincts whose coverage fell outside the tolerance band.
    #[inline] pub fn violations(&self) -> &[String] { &self.violations }

    pub fn coverage(&self, precinct: &str) -> Option<f64> {
        let ids = self.data.column(PRECINCT_COL).ok()?.str().ok()?;
        let coverage = self.data.column(COVERAGE_COL).ok()?.f64().ok()?;
        ids.into_iter().zip(coverage.into_iter())
            .find(|(id, _)| *id == Some(precinct))
            .and_then(|(_, c)| c)
    }

    /// Per-precinct lookup of every apportioned column.
    pub fn values(&self) -> Result<PrecinctValues> {
        PrecinctValues::from_dataframe(&self.data)
    }

    /// Persist as `census_by_precinct_<key>.csv` in `dir`.
    pub fn write(&self, dir: &Path, key: &str) -> Result<PathBuf> {
        let path = dir.join(format!("census_by_precinct_{key}.csv"));
        write_csv(&mut self.data.clone(), &path)?;
        tracing::info!("[census::apportion] saved {}", path.display());
        Ok(path)
    }
}

/// Apportioned census values indexed by precinct id.
#[derive(Debug, Clone, Default)]
pub struct PrecinctValues {
    columns: Vec<String>,
    rows: AHashMap<String, Vec<Option<f64>>>,
}

impl PrecinctValues {
    /// Index a table with a `precname` column; every other column is read as
    /// Float64.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let ids = df.column(PRECINCT_COL)
            .map_err(|_| Error::MissingColumn(PRECINCT_COL.to_string()))?
            .cast(&DataType::String)?;

        let mut columns = Vec::new();
        let mut values = Vec::new();
        for column in df.get_columns().iter().filter(|c| c.name() != PRECINCT_COL) {
            let cast = column.cast(&DataType::Float64)
                .with_context(|| format!("[census::apportion] column {:?} is not numeric", column.name()))?;
            values.push(cast.f64()?.into_iter().collect::<Vec<_>>());
            columns.push(column.name().to_string());
        }

        let rows = ids.str()?.into_iter().enumerate()
            .filter_map(|(i, id)| id.map(|id| (id.to_string(), values.iter().map(|v| v[i]).collect())))
            .collect();
        Ok(Self { columns, rows })
    }

    #[inline] pub fn columns(&self) -> &[String] { &self.columns }

    #[inline] pub fn len(&self) -> usize { self.rows.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Values of one precinct, aligned with `columns()`.
    pub fn get(&self, precinct: &str) -> Option<&[Option<f64>]> {
        self.rows.get(precinct).map(Vec::as_slice)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

/// Area-weight block-group census values onto precincts.
///
/// Each precinct receives, per variable, the sum over the block groups it
/// overlaps of `value × intersection area / precinct area`. Block groups
/// missing from `census` contribute nothing and are listed in one warning; a
/// variable none of whose fragments has a value stays null, as does every
/// variable of a precinct with no overlapping block group (coverage 0).
pub fn apportion(
    precincts: &PolygonLayer,
    block_groups: &PolygonLayer,
    census: &CensusTable,
    variables: &[String],
    tolerance: ApportionTolerance,
    report: &mut QualityReport,
) -> Result<Apportionment> {
    let overlaps = precincts.geometries().intersections(block_groups.geometries(), 0.0);
    tracing::debug!("[census::apportion] {} x {}: {} fragments", precincts.name(), block_groups.name(), overlaps.len());

    let (mut names, mut geoids, mut fractions) = (Vec::new(), Vec::new(), Vec::new());
    for overlap in overlaps {
        let area = precincts.areas()[overlap.source];
        if area <= 0.0 { continue }
        names.push(precincts.ids()[overlap.source].as_str());
        geoids.push(block_groups.ids()[overlap.target].as_str());
        fractions.push(overlap.area / area);
    }

    let values = census.select(variables)?;
    let known = values.column(GEOID_COL)?.str()?.into_iter().flatten().collect::<AHashSet<_>>();
    let mut missing = geoids.iter().copied()
        .filter(|geoid| !known.contains(geoid))
        .map(str::to_string)
        .collect::<Vec<_>>();
    missing.sort_unstable();
    missing.dedup();
    if !missing.is_empty() {
        report.warn(Warning::MissingCensusRows { layer: block_groups.name().to_string(), geoids: missing });
    }

    let fragments = DataFrame::new(vec![
        Column::new(PRECINCT_COL.into(), names),
        Column::new(GEOID_COL.into(), geoids),
        Column::new(FRACTION_COL.into(), fractions),
    ])?;

    let weighted = fragments.lazy()
        .left_join(values.lazy(), col(GEOID_COL), col(GEOID_COL))
        .with_columns(variables.iter()
            .map(|v| (col(v.as_str()) * col(FRACTION_COL)).alias(v.as_str()))
            .collect::<Vec<_>>())
        .group_by([col(PRECINCT_COL)])
        .agg(once(col(FRACTION_COL).sum().alias(COVERAGE_COL))
            .chain(variables.iter().map(|v| {
                // A plain sum would turn an all-null group into 0.
                when(col(v.as_str()).null_count().eq(len()))
                    .then(lit(NULL).cast(DataType::Float64))
                    .otherwise(col(v.as_str()).sum())
                    .alias(v.as_str())
            }))
            .collect::<Vec<_>>())
        .collect()
        .context("[census::apportion] aggregation by precinct failed")?;

    // Base frame so every precinct has a row, overlapping or not.
    let base = DataFrame::new(vec![
        Column::new(PRECINCT_COL.into(), precincts.ids().to_vec()),
    ])?;
    let data = base.lazy()
        .left_join(weighted.lazy(), col(PRECINCT_COL), col(PRECINCT_COL))
        .with_column(col(COVERAGE_COL).fill_null(lit(0.0)))
        .sort([PRECINCT_COL], SortMultipleOptions::default())
        .collect()?;

    let violations = data.column(PRECINCT_COL)?.str()?.into_iter()
        .zip(data.column(COVERAGE_COL)?.f64()?.into_iter())
        .filter_map(|(id, coverage)| match (id, coverage) {
            (Some(id), Some(c)) if !tolerance.contains(c) => Some(id.to_string()),
            _ => None,
        })
        .collect::<Vec<_>>();
    if !violations.is_empty() {
        report.warn(Warning::CoverageOutOfRange { layer: precincts.name().to_string(), precincts: violations.clone() });
    }

    Ok(Apportionment { data, violations })
}
