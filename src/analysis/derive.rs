//! Variables derived from a precinct's results and its apportioned census
//! values. Every ratio is partial: an undefined result is `None`.

use serde::Serialize;

use crate::{
    election::NimbyVote,
    era::{is_november, is_presidential, ElectionDate},
};

/// Ballots cast over registered voters.
pub fn turnout(voted: u64, registered: Option<u64>) -> Option<f64> {
    match registered {
        Some(r) if r > 0 => Some(voted as f64 / r as f64),
        _ => None,
    }
}

/// Votes on the NIMBY side of a proposition.
pub fn nimby_total(vote: NimbyVote, yes: u64, no: u64) -> u64 {
    match vote {
        NimbyVote::Yes => yes,
        NimbyVote::No => no,
    }
}

/// NIMBY votes over votes cast on the proposition. Ballots that skipped the
/// proposition are not in the denominator.
pub fn nimby_share(vote: NimbyVote, yes: u64, no: u64) -> Option<f64> {
    let total = yes + no;
    (total > 0).then(|| nimby_total(vote, yes, no) as f64 / total as f64)
}

/// Election-level indicator variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EraDummies {
    pub year: u16,
    pub pres_elec: bool,
    pub nov_elec: bool,
    /// Date code and letter, e.g. `199811E`.
    pub yr_prop: String,
}

impl EraDummies {
    pub fn new(date: ElectionDate, letter: &str) -> Self {
        Self {
            year: date.year(),
            pres_elec: is_presidential(date),
            nov_elec: is_november(date),
            yr_prop: format!("{date}{letter}"),
        }
    }
}

/// Years elapsed between a census median year and the election year.
pub fn years_since(year: u16, median_year: Option<f64>) -> Option<f64> {
    median_year.filter(|y| y.is_finite()).map(|y| f64::from(year) - y)
}

/// Dollar amount scaled to 2014 dollars.
pub fn adjust_inflation(value: Option<f64>, multiplier: f64) -> Option<f64> {
    value.filter(|v| v.is_finite()).map(|v| v * multiplier)
}
