use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result};

use crate::{
    census::{apportion, read_variables, Apportionment, CensusTable, PolygonLayer, PrecinctValues, PRECINCT_COL},
    common::{require_dir_exists, QualityReport},
    config::PipelineConfig,
    era::{census_key, PAIRINGS},
    io::csv::read_csv_with_text_columns,
};

/// Apportion every (census, boundary) pairing whose inputs are configured,
/// keyed by census key (e.g. `ce2000pre1992`). Each layer is loaded once.
pub fn apportion_all(config: &PipelineConfig, report: &mut QualityReport) -> Result<BTreeMap<String, Apportionment>> {
    let mut boundaries = BTreeMap::new();
    let mut census = BTreeMap::new();
    let mut results = BTreeMap::new();

    for (vintage, boundary) in PAIRINGS {
        let key = census_key(vintage, boundary);
        let (Some(census_source), Some(boundary_source)) = (config.census.get(&vintage), config.boundaries.get(&boundary)) else {
            tracing::info!("[pipeline] skipping {key}: inputs not configured");
            continue;
        };

        if !boundaries.contains_key(&boundary) {
            let layer = PolygonLayer::from_shapefile(
                boundary.key(), &config.resolve(&boundary_source.path), boundary_source, &config.target_crs, report,
            )?;
            boundaries.insert(boundary, layer);
        }
        if !census.contains_key(&vintage) {
            let block_groups = PolygonLayer::from_shapefile(
                vintage.key(),
                &config.resolve(&census_source.block_groups.path),
                &census_source.block_groups,
                &config.target_crs,
                report,
            )?;
            let table = CensusTable::from_csv(&config.resolve(&census_source.table))?;
            let variables = read_variables(&config.resolve(&census_source.variables))?;
            tracing::info!("[pipeline] {vintage}: {} block groups, {} variables", table.height(), variables.len());
            census.insert(vintage, (block_groups, table, variables));
        }

        let (block_groups, table, variables) = &census[&vintage];
        let result = apportion(&boundaries[&boundary], block_groups, table, variables, config.tolerance, report)
            .with_context(|| format!("[pipeline] Failed to apportion {key}"))?;
        results.insert(key, result);
    }

    Ok(results)
}

/// Read back the `census_by_precinct_<key>.csv` tables present in `dir`.
pub fn read_apportioned(dir: &Path) -> Result<BTreeMap<String, PrecinctValues>> {
    require_dir_exists(dir)?;
    let mut tables = BTreeMap::new();
    for (vintage, boundary) in PAIRINGS {
        let key = census_key(vintage, boundary);
        let path = dir.join(format!("census_by_precinct_{key}.csv"));
        if !path.exists() { continue }

        let df = read_csv_with_text_columns(&path, &[PRECINCT_COL])?;
        let values = PrecinctValues::from_dataframe(&df)
            .with_context(|| format!("[pipeline] Invalid apportioned table {}", path.display()))?;
        tables.insert(key, values);
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::census::COVERAGE_COL;

    #[test]
    fn unconfigured_pairings_are_skipped() {
        let config: PipelineConfig = toml::from_str(r#"propositions = "props.csv""#).unwrap();
        let mut report = QualityReport::new();
        assert!(apportion_all(&config, &mut report).unwrap().is_empty());
    }

    #[test]
    fn apportioned_tables_read_back_by_key() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("census_by_precinct_ce2012pre2012.csv"),
            format!("{PRECINCT_COL},{COVERAGE_COL},pop\n0101,1.0,1200.5\n"),
        ).unwrap();

        let tables = read_apportioned(tmp.path()).unwrap();
        assert_eq!(tables.keys().collect::<Vec<_>>(), vec!["ce2012pre2012"]);
        assert_eq!(tables["ce2012pre2012"].get("0101"), Some([Some(1.0), Some(1200.5)].as_slice()));
    }
}
