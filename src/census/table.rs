use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::{common::Error, io::csv::read_csv_with_text_columns};

/// Block-group id column of a census table.
pub const GEOID_COL: &str = "geoid";

/// FIPS parts concatenated into a geoid when the table has none.
const GEOID_PARTS: [&str; 4] = ["state", "county", "tract", "block group"];

/// Block-group census values keyed by `geoid`.
#[derive(Debug, Clone)]
pub struct CensusTable {
    data: DataFrame,
}

impl CensusTable {
    /// Wrap a data frame, building `geoid` from its FIPS parts if absent.
    pub fn new(mut data: DataFrame) -> Result<Self> {
        if data.column(GEOID_COL).is_err() {
            let parts = GEOID_PARTS.iter()
                .map(|&name| -> Result<_> {
                    Ok(data.column(name)
                        .map_err(|_| Error::MissingColumn(name.to_string()))?
                        .cast(&DataType::String)?)
                })
                .collect::<Result<Vec<_>>>()?;
            let parts = parts.iter().map(|part| part.str()).collect::<PolarsResult<Vec<_>>>()?;

            // A row missing any part gets a null geoid.
            let geoids = (0..data.height())
                .map(|i| parts.iter()
                    .map(|part| part.get(i))
                    .collect::<Option<Vec<_>>>()
                    .map(|parts| parts.concat()))
                .collect::<Vec<_>>();
            data.with_column(Column::new(GEOID_COL.into(), geoids))?;
        } else {
            let geoids = data.column(GEOID_COL)?.cast(&DataType::String)?;
            data.with_column(geoids)?;
        }
        Ok(Self { data })
    }

    /// Read a census CSV, keeping identifier columns as text.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut text_columns = vec![GEOID_COL];
        text_columns.extend(GEOID_PARTS);
        let data = read_csv_with_text_columns(path, &text_columns)?;
        Self::new(data).with_context(|| format!("[census::table] Invalid census table {}", path.display()))
    }

    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    #[inline] pub fn height(&self) -> usize { self.data.height() }

    /// `geoid` plus the requested variables as Float64.
    pub fn select(&self, variables: &[String]) -> Result<DataFrame> {
        for name in variables {
            if self.data.column(name).is_err() {
                return Err(Error::MissingColumn(name.clone()).into());
            }
        }
        Ok(self.data.clone().lazy()
            .select(std::iter::once(col(GEOID_COL))
                .chain(variables.iter().map(|name| col(name.as_str()).cast(DataType::Float64)))
                .collect::<Vec<_>>())
            .collect()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geoid_built_from_fips_parts() {
        let df = DataFrame::new(vec![
            Column::new("state".into(), &["06", "06"]),
            Column::new("county".into(), &["075", "075"]),
            Column::new("tract".into(), &["010100", "010200"]),
            Column::new("block group".into(), &["1", "2"]),
            Column::new("pop".into(), &[1200i64, 800]),
        ]).unwrap();

        let table = CensusTable::new(df).unwrap();
        let geoids = table.data().column(GEOID_COL).unwrap().str().unwrap();
        assert_eq!(geoids.get(0), Some("060750101001"));
        assert_eq!(geoids.get(1), Some("060750102002"));
    }

    #[test]
    fn select_casts_variables_and_checks_presence() {
        let df = DataFrame::new(vec![
            Column::new("geoid".into(), &["060750101001"]),
            Column::new("pop".into(), &[1200i64]),
        ]).unwrap();
        let table = CensusTable::new(df).unwrap();

        let selected = table.select(&["pop".to_string()]).unwrap();
        assert_eq!(selected.column("pop").unwrap().f64().unwrap().get(0), Some(1200.0));

        let err = table.select(&["med_inc".to_string()]).unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::MissingColumn("med_inc".into())));
    }

    #[test]
    fn from_csv_keeps_leading_zeros() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("census_data_2012.csv");
        std::fs::write(&path, "state,county,tract,block group,pop\n06,075,010100,1,1200\n").unwrap();

        let table = CensusTable::from_csv(&path).unwrap();
        assert_eq!(table.height(), 1);
        assert_eq!(table.data().column(GEOID_COL).unwrap().str().unwrap().get(0), Some("060750101001"));
    }
}
