use std::collections::BTreeMap;

use anyhow::{anyhow, Result};

use crate::{
    census::PrecinctValues,
    common::{Error, QualityReport},
    config::DerivationColumns,
    election::{is_descriptive, NimbyVote, PropositionTable},
    era::{route, ElectionDate, EraRoute},
};

/// Everything a stage needs to know about the unit it is transforming.
///
/// One context is built per (election, proposition) and owns that unit's
/// quality report; reference tables are borrowed.
#[derive(Debug)]
pub struct TransformContext<'a> {
    pub date: ElectionDate,
    pub letter: String,
    pub route: EraRoute,
    pub propositions: &'a PropositionTable,
    /// Apportioned census values keyed by census key.
    pub census: &'a BTreeMap<String, PrecinctValues>,
    pub columns: &'a DerivationColumns,
    pub report: QualityReport,
}

impl<'a> TransformContext<'a> {
    pub fn new(
        date: ElectionDate,
        letter: &str,
        propositions: &'a PropositionTable,
        census: &'a BTreeMap<String, PrecinctValues>,
        columns: &'a DerivationColumns,
    ) -> Self {
        Self {
            date,
            letter: letter.to_string(),
            route: route(date),
            propositions,
            census,
            columns,
            report: QualityReport::new(),
        }
    }

    #[inline] pub fn descriptive(&self) -> bool { is_descriptive(self.date) }

    pub fn nimby_vote(&self) -> Result<NimbyVote, Error> {
        self.propositions.nimby_vote(self.date, &self.letter)
    }

    /// The apportioned census table selected by this unit's era.
    pub fn census_values(&self) -> Result<&'a PrecinctValues> {
        let key = self.route.census_key();
        self.census.get(&key)
            .ok_or_else(|| anyhow!("[pipeline] no apportioned census table {key} for {} {}", self.date, self.letter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_routes_and_looks_up_nimby() {
        let date: ElectionDate = "199811".parse().unwrap();
        let mut props = PropositionTable::new();
        props.insert(date, "E", NimbyVote::Yes);
        let census = BTreeMap::from([("ce2000pre1992".to_string(), PrecinctValues::default())]);
        let columns = DerivationColumns::default();

        let ctx = TransformContext::new(date, "E", &props, &census, &columns);
        assert!(!ctx.descriptive());
        assert_eq!(ctx.route.census_key(), "ce2000pre1992");
        assert_eq!(ctx.nimby_vote(), Ok(NimbyVote::Yes));
        assert!(ctx.census_values().is_ok());
    }

    #[test]
    fn pre_1992_elections_use_the_oldest_era() {
        let date: ElectionDate = "199111".parse().unwrap();
        let props = PropositionTable::new();
        let census = BTreeMap::new();
        let columns = DerivationColumns::default();

        let ctx = TransformContext::new(date, "A", &props, &census, &columns);
        assert_eq!(ctx.route.census_key(), "ce2000pre1992");
        assert_eq!(ctx.route.inflation, 1.42);
        assert!(ctx.census_values().is_err());
        assert_eq!(ctx.nimby_vote(), Err(Error::UnknownProposition { date, letter: "A".into() }));
    }
}
