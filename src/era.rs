//! Routing of election dates to census vintage, precinct boundary vintage and
//! inflation multiplier.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::common::Error;

/// Election month as a `YYYYMM` code, e.g. `199811`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ElectionDate(u32);

impl ElectionDate {
    #[inline] pub fn code(&self) -> u32 { self.0 }

    #[inline] pub fn year(&self) -> u16 { (self.0 / 100) as u16 }

    #[inline] pub fn month(&self) -> u8 { (self.0 % 100) as u8 }
}

impl FromStr for ElectionDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidDate(s.to_string()));
        }
        let code: u32 = s.parse().map_err(|_| Error::InvalidDate(s.to_string()))?;
        if !(1..=12).contains(&(code % 100)) {
            return Err(Error::InvalidDate(s.to_string()));
        }
        Ok(Self(code))
    }
}

impl TryFrom<String> for ElectionDate {
    type Error = Error;
    fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

impl From<ElectionDate> for String {
    fn from(date: ElectionDate) -> Self { date.to_string() }
}

impl fmt::Display for ElectionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:06}", self.0) }
}

// Boundary codes are compared against raw YYYYMM values; `200400` sorts
// before every real 2004 election.
const PRE1992_LAST: u32 = 200211;
const CENSUS2000_LAST: u32 = 200400;
const PRE2012_FIRST: u32 = 201211;

/// Election dates in the fixed list of November presidential generals.
const PRESIDENTIAL: [u32; 6] = [201211, 200811, 200411, 200011, 199611, 199211];

/// Precinct boundary set, named by the year it took effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryVintage {
    Pre1992,
    Pre2002,
    Pre2012,
}

impl BoundaryVintage {
    pub const ALL: [BoundaryVintage; 3] = [Self::Pre1992, Self::Pre2002, Self::Pre2012];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Pre1992 => "pre1992",
            Self::Pre2002 => "pre2002",
            Self::Pre2012 => "pre2012",
        }
    }

    pub fn year(&self) -> u16 {
        match self {
            Self::Pre1992 => 1992,
            Self::Pre2002 => 2002,
            Self::Pre2012 => 2012,
        }
    }

    /// True iff elections on `date` were reported against this boundary set.
    pub fn covers(&self, date: ElectionDate) -> bool {
        let d = date.code();
        match self {
            Self::Pre1992 => d <= PRE1992_LAST,
            Self::Pre2002 => d > PRE1992_LAST && d < PRE2012_FIRST,
            Self::Pre2012 => d >= PRE2012_FIRST,
        }
    }
}

impl fmt::Display for BoundaryVintage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.key()) }
}

/// Census dataset whose block-group values describe an election era.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CensusVintage {
    Ce2000,
    Ce2007,
    Ce2012,
}

impl CensusVintage {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Ce2000 => "ce2000",
            Self::Ce2007 => "ce2007",
            Self::Ce2012 => "ce2012",
        }
    }
}

impl fmt::Display for CensusVintage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.key()) }
}

/// Which census table, precinct boundaries and dollar multiplier apply to an election.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EraRoute {
    pub census: CensusVintage,
    pub boundary: BoundaryVintage,
    /// Multiplier converting the census dollar year to 2014 dollars.
    pub inflation: f64,
}

impl EraRoute {
    /// Key of the apportioned census table, e.g. `ce2000pre1992`.
    pub fn census_key(&self) -> String { census_key(self.census, self.boundary) }
}

/// Every (census, boundary) pairing an election can route to, oldest first.
pub const PAIRINGS: [(CensusVintage, BoundaryVintage); 4] = [
    (CensusVintage::Ce2000, BoundaryVintage::Pre1992),
    (CensusVintage::Ce2000, BoundaryVintage::Pre2002),
    (CensusVintage::Ce2007, BoundaryVintage::Pre2002),
    (CensusVintage::Ce2012, BoundaryVintage::Pre2012),
];

pub fn census_key(census: CensusVintage, boundary: BoundaryVintage) -> String {
    format!("{}{}", census.key(), boundary.key())
}

/// Map an election date to its era. Every valid `YYYYMM` date has one: the
/// oldest era is open-ended.
pub fn route(date: ElectionDate) -> EraRoute {
    let (census, boundary, inflation) = match date.code() {
        d if d <= PRE1992_LAST => (CensusVintage::Ce2000, BoundaryVintage::Pre1992, 1.42),
        d if d <= CENSUS2000_LAST => (CensusVintage::Ce2000, BoundaryVintage::Pre2002, 1.42),
        d if d < PRE2012_FIRST => (CensusVintage::Ce2007, BoundaryVintage::Pre2002, 1.03),
        _ => (CensusVintage::Ce2012, BoundaryVintage::Pre2012, 1.00),
    };
    EraRoute { census, boundary, inflation }
}

/// Parse and route a `YYYYMM` string in one step. Malformed dates are the
/// only inputs without an era.
pub fn route_str(date: &str) -> Result<EraRoute, Error> {
    Ok(route(date.parse()?))
}

#[inline]
pub fn is_presidential(date: ElectionDate) -> bool { PRESIDENTIAL.contains(&date.code()) }

#[inline]
pub fn is_november(date: ElectionDate) -> bool { date.month() == 11 }
