//! IO module for format-specific reading and writing operations.
//!
//! # Format Modules
//!
//! - `csv` - CSV format for census tables, metadata and outputs
//! - `shp` - Shapefile format for precinct and block-group boundaries
//! - `workbook` - Excel workbooks holding the election results

pub(crate) mod csv;
pub(crate) mod shp;
pub(crate) mod workbook;
