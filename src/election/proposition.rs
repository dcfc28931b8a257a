use std::{collections::HashMap, str::FromStr};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, prelude::DataType};
use serde::Serialize;

use crate::{common::Error, era::ElectionDate};

/// Which side of a proposition is scored as the "not in my backyard" position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NimbyVote {
    Yes,
    No,
}

impl FromStr for NimbyVote {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "YES" | "Y" => Ok(NimbyVote::Yes),
            "NO" | "N" => Ok(NimbyVote::No),
            _ => Err(Error::InvalidNimbyVote(s.to_string())),
        }
    }
}

/// Proposition metadata keyed by (election date, letter).
#[derive(Debug, Clone, Default)]
pub struct PropositionTable {
    nimby: HashMap<(ElectionDate, String), NimbyVote>,
}

impl PropositionTable {
    pub const DATE_COL: &'static str = "Date_str";
    pub const LETTER_COL: &'static str = "Letter";
    pub const NIMBY_COL: &'static str = "Vote that equals NIMBY";

    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, date: ElectionDate, letter: &str, vote: NimbyVote) {
        self.nimby.insert((date, letter.trim().to_uppercase()), vote);
    }

    #[inline] pub fn len(&self) -> usize { self.nimby.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.nimby.is_empty() }

    /// Look up which vote counts as NIMBY for a proposition.
    pub fn nimby_vote(&self, date: ElectionDate, letter: &str) -> Result<NimbyVote, Error> {
        self.nimby.get(&(date, letter.trim().to_uppercase()))
            .copied()
            .ok_or_else(|| Error::UnknownProposition { date, letter: letter.to_string() })
    }

    /// Build the table from the proposals sheet. Rows with a missing date,
    /// letter or NIMBY value are propositions that were not scored and are
    /// skipped; a NIMBY value that is present but unreadable is an error.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let column = |name: &str| -> Result<_> {
            df.column(name)
                .map_err(|_| Error::MissingColumn(name.to_string()))?
                .cast(&DataType::String)
                .with_context(|| format!("[proposition] column {name:?} is not text"))
        };

        let dates = column(Self::DATE_COL)?;
        let letters = column(Self::LETTER_COL)?;
        let votes = column(Self::NIMBY_COL)?;

        let mut table = Self::new();
        for ((date, letter), vote) in dates.str()?.into_iter()
            .zip(letters.str()?.into_iter())
            .zip(votes.str()?.into_iter())
        {
            let (Some(date), Some(letter), Some(vote)) = (date, letter, vote) else { continue };
            let vote = vote.parse::<NimbyVote>()
                .with_context(|| format!("[proposition] bad {} value for proposition {date} {letter}", Self::NIMBY_COL))?;
            let date: ElectionDate = date.parse()
                .with_context(|| format!("[proposition] bad {} value for proposition {letter}", Self::DATE_COL))?;
            table.insert(date, letter, vote);
        }

        Ok(table)
    }
}
