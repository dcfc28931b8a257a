//! Assembly of the per-precinct analysis table.

mod derive;
mod table;

pub use derive::{adjust_inflation, nimby_share, nimby_total, turnout, years_since, EraDummies};
pub use table::{AnalysisRow, AnalysisTable};
