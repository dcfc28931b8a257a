//! CSV reading operations.

use std::{fs::File, path::Path, sync::Arc};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, CsvReader, DataType, Field, Schema}};

/// Reads a CSV file into a Polars DataFrame, forcing the named columns to be read as strings so that
/// identifiers such as census GEOIDs and precinct names keep their leading zeros.
/// Names absent from the file are ignored.
pub(crate) fn read_csv_with_text_columns(path: &Path, text_columns: &[&str]) -> Result<DataFrame> {
    // Polars rejects overwrites for columns the file does not have.
    let header = header_names(path)?;
    let schema = Arc::new(Schema::from_iter(
        text_columns.iter()
            .filter(|&&name| header.iter().any(|h| h == name))
            .map(|&name| Field::new(name.into(), DataType::String))
    ));
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    let options = CsvReadOptions::default()
        .with_has_header(true)
        .with_schema_overwrite(Some(schema));

    CsvReader::new(file)
        .with_options(options)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Column names of a CSV file, parsed by polars from the header and first row.
fn header_names(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    let head = CsvReader::new(file)
        .with_options(CsvReadOptions::default().with_has_header(true).with_n_rows(Some(1)))
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV header: {}", path.display()))?;
    Ok(head.get_column_names().into_iter().map(|name| name.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_columns_keep_leading_zeros() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("census_data_2000.csv");
        std::fs::write(&path, "geoid,state,pop\n060750101001,06,1200\n060750101002,06,800\n").unwrap();

        let df = read_csv_with_text_columns(&path, &["geoid", "state", "precname"]).unwrap();
        let geoids = df.column("geoid").unwrap().str().unwrap();
        assert_eq!(geoids.get(0), Some("060750101001"));
        assert_eq!(df.column("state").unwrap().str().unwrap().get(1), Some("06"));
        assert_eq!(df.column("pop").unwrap().i64().unwrap().get(1), Some(800));
    }

    #[test]
    fn quoted_header_names_may_contain_commas() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("variables.csv");
        std::fs::write(&path, "\"tract, label\",geoid,pop\n\"010100, north\",060750101001,1200\n").unwrap();

        let df = read_csv_with_text_columns(&path, &["geoid", "tract, label"]).unwrap();
        assert_eq!(df.width(), 3);
        assert_eq!(df.column("geoid").unwrap().str().unwrap().get(0), Some("060750101001"));
        assert_eq!(df.column("tract, label").unwrap().str().unwrap().get(0), Some("010100, north"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(read_csv_with_text_columns(&tmp.path().join("nope.csv"), &[]).is_err());
    }
}
