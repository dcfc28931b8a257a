//! Census block-group data and its apportionment onto precincts.

mod apportion;
mod layer;
mod table;
mod variables;

pub use apportion::{apportion, Apportionment, PrecinctValues, COVERAGE_COL, PRECINCT_COL};
pub use layer::PolygonLayer;
pub use table::{CensusTable, GEOID_COL};
pub use variables::{read_variables, selected_variables};
