use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, DataType, Range, Reader};
use regex::RegexBuilder;

use crate::{
    common::Error,
    config::SheetParams,
    election::{RawElectionTable, RowLabel},
    era::ElectionDate,
};

/// Names of every worksheet in a workbook, in workbook order.
pub(crate) fn sheet_names(path: &Path) -> Result<Vec<String>> {
    let workbook = open_workbook_auto(path)
        .with_context(|| format!("[io::workbook] Failed to open workbook: {}", path.display()))?;
    Ok(workbook.sheet_names().to_vec())
}

/// Sheet names matching `pattern` and not matching `exclude` (both
/// case-insensitive), in their original order.
pub(crate) fn matching_sheets(names: &[String], pattern: &str, exclude: Option<&str>) -> Result<Vec<String>> {
    let include = RegexBuilder::new(pattern).case_insensitive(true).build()
        .with_context(|| format!("[io::workbook] Invalid sheet pattern {pattern:?}"))?;
    let exclude = exclude
        .map(|p| RegexBuilder::new(p).case_insensitive(true).build()
            .with_context(|| format!("[io::workbook] Invalid exclusion pattern {p:?}")))
        .transpose()?;

    Ok(names.iter()
        .filter(|name| include.is_match(name))
        .filter(|name| !exclude.as_ref().is_some_and(|re| re.is_match(name)))
        .cloned()
        .collect())
}

/// Read one proposition sheet into a raw election table.
pub(crate) fn read_sheet(
    path: &Path,
    sheet: &str,
    params: &SheetParams,
    date: ElectionDate,
    letter: &str,
) -> Result<RawElectionTable> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("[io::workbook] Failed to open workbook: {}", path.display()))?;

    let range = workbook.worksheet_range(sheet)
        .ok_or_else(|| Error::SheetNotFound { workbook: path.display().to_string(), sheet: sheet.to_string() })?
        .with_context(|| format!("[io::workbook] Failed to read sheet {sheet:?} in {}", path.display()))?;

    table_from_range(&range, params, date, letter)
}

/// Cut the results table out of a worksheet range.
///
/// Rows: `skiprows` rows are skipped, the next row is the header (ignored),
/// and the last `skip_footer` rows are dropped. Rows whose kept cells are all
/// empty are skipped. With a two-column index, an empty first-level cell
/// repeats the last precinct seen above it.
pub(crate) fn table_from_range(
    range: &Range<DataType>,
    params: &SheetParams,
    date: ElectionDate,
    letter: &str,
) -> Result<RawElectionTable> {
    if !(1..=2).contains(&params.index_col.len()) {
        bail!("[io::workbook] index_col must name one or two columns, got {:?}", params.index_col);
    }

    // Positions are absolute so that blank leading rows/columns count.
    let Some((last_row, last_col)) = range.end() else {
        return Ok(RawElectionTable::from_cells(date, letter, Vec::new())?);
    };
    let columns = match &params.parse_cols {
        Some(cols) => cols.iter().map(|&c| c as u32).collect::<Vec<_>>(),
        None => (0..=last_col).collect(),
    };
    if let Some(&bad) = params.index_col.iter().find(|&&i| i >= columns.len()) {
        bail!("[io::workbook] index column {bad} is outside the {} parsed columns", columns.len());
    }

    let first = params.skiprows as u32 + 1;
    let end = (last_row + 1).saturating_sub(params.skip_footer as u32);

    let mut rows = Vec::new();
    let mut last_precinct: Option<String> = None;
    for r in first..end {
        let cells = columns.iter()
            .map(|&c| range.get_value((r, c)).unwrap_or(&DataType::Empty))
            .collect::<Vec<_>>();
        if cells.iter().all(|cell| matches!(cell, DataType::Empty)) { continue }

        let label = match params.index_col.as_slice() {
            [i] => RowLabel::Single(cell_text(cells[*i]).unwrap_or_default()),
            [i, j] => {
                let precinct = match cell_text(cells[*i]) {
                    Some(text) => { last_precinct = Some(text.clone()); text }
                    None => last_precinct.clone().unwrap_or_default(),
                };
                RowLabel::Compound { precinct, kind: cell_text(cells[*j]).unwrap_or_default() }
            }
            _ => unreachable!(),
        };

        let values = cells.iter().enumerate()
            .filter(|(k, _)| !params.index_col.contains(k))
            .map(|(_, cell)| cell_number(cell))
            .collect::<Vec<_>>();
        rows.push((label, values));
    }

    Ok(RawElectionTable::from_cells(date, letter, rows)?)
}

/// Cell as a label; integral numbers lose their ".0".
fn cell_text(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) if !s.trim().is_empty() => Some(s.clone()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 => Some(format!("{f:.0}")),
        DataType::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

/// Cell as a count. Text cells are parsed, ignoring thousands separators.
fn cell_number(cell: &DataType) -> Option<f64> {
    match cell {
        DataType::Int(i) => Some(*i as f64),
        DataType::Float(f) => Some(*f),
        DataType::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}
