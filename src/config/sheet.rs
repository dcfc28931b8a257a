use serde::{Deserialize, Serialize};

use crate::era::ElectionDate;

/// How to cut a results table out of a worksheet.
///
/// Column positions in `parse_cols` are absolute worksheet columns; positions
/// in `index_col` are relative to the kept columns. Every kept column that is
/// not an index column must be a value column (registered, voted, yes, no).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetParams {
    pub index_col: Vec<usize>,
    pub skiprows: usize,
    pub parse_cols: Option<Vec<usize>>,
    pub skip_footer: usize,
}

impl Default for SheetParams {
    fn default() -> Self {
        Self { index_col: vec![0], skiprows: 0, parse_cols: None, skip_footer: 0 }
    }
}

/// Per-(date, letter) deviations from the default sheet layout. Unset fields
/// inherit the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetOverride {
    pub date: ElectionDate,
    pub letter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_col: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skiprows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_cols: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_footer: Option<usize>,
}

/// Default sheet layout plus a sparse override list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetParamTable {
    pub defaults: SheetParams,
    pub overrides: Vec<SheetOverride>,
}

impl SheetParamTable {
    /// Resolve the parameters for one proposition sheet.
    pub fn params(&self, date: ElectionDate, letter: &str) -> SheetParams {
        let mut params = self.defaults.clone();
        let found = self.overrides.iter()
            .find(|o| o.date == date && o.letter.eq_ignore_ascii_case(letter));

        if let Some(o) = found {
            if let Some(index_col) = &o.index_col { params.index_col = index_col.clone() }
            if let Some(skiprows) = o.skiprows { params.skiprows = skiprows }
            if let Some(parse_cols) = &o.parse_cols { params.parse_cols = Some(parse_cols.clone()) }
            if let Some(skip_footer) = o.skip_footer { params.skip_footer = skip_footer }
        }
        params
    }
}
