use std::path::Path;

use anyhow::Result;
use polars::prelude::*;

use crate::{common::Error, io::csv::read_csv_with_text_columns};

const NAME_COL: &str = "name";
const USE_COL: &str = "use_in_final";

/// Names of the census variables selected for apportionment: rows of the
/// variable code list whose `use_in_final` is `yes`.
pub fn selected_variables(codes: &DataFrame) -> Result<Vec<String>> {
    let column = |name: &str| -> Result<Column> {
        Ok(codes.column(name)
            .map_err(|_| Error::MissingColumn(name.to_string()))?
            .cast(&DataType::String)?)
    };
    let names = column(NAME_COL)?;
    let flags = column(USE_COL)?;

    Ok(names.str()?.into_iter()
        .zip(flags.str()?.into_iter())
        .filter_map(|(name, flag)| match (name, flag) {
            (Some(name), Some(flag)) if flag.trim().eq_ignore_ascii_case("yes") => Some(name.trim().to_string()),
            _ => None,
        })
        .collect())
}

/// Read the variable code list from CSV.
pub fn read_variables(path: &Path) -> Result<Vec<String>> {
    selected_variables(&read_csv_with_text_columns(path, &[NAME_COL, USE_COL])?)
}
