use anyhow::Context;

use crate::{
    config::PipelineConfig,
    election::RawElectionTable,
    era::ElectionDate,
    io::workbook::read_sheet,
};

/// One proposition's raw tally sheet.
#[derive(Debug, Clone)]
pub struct Proposition {
    pub letter: String,
    pub table: RawElectionTable,
}

/// All propositions on the ballot of one election.
#[derive(Debug, Clone)]
pub struct Election {
    pub date: ElectionDate,
    pub propositions: Vec<Proposition>,
}

/// A proposition that could not be loaded.
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub date: ElectionDate,
    pub letter: String,
    pub error: String,
}

/// Every election of a run, ordered by date.
#[derive(Debug, Clone, Default)]
pub struct ElectionSet {
    elections: Vec<Election>,
}

impl ElectionSet {
    pub fn new(mut elections: Vec<Election>) -> Self {
        elections.sort_by_key(|e| e.date);
        for election in &mut elections {
            election.propositions.sort_by(|a, b| a.letter.cmp(&b.letter));
        }
        Self { elections }
    }

    /// Read every configured proposition sheet. A sheet that fails to load
    /// is returned as a failure; the others are kept.
    pub fn load(config: &PipelineConfig) -> (Self, Vec<LoadFailure>) {
        let mut failures = Vec::new();
        let mut elections = Vec::with_capacity(config.elections.len());

        for source in &config.elections {
            let path = config.resolve(&source.workbook);
            let mut propositions = Vec::with_capacity(source.props.len());
            for (letter, sheet) in &source.props {
                let params = config.sheets.params(source.date, letter);
                let loaded = read_sheet(&path, sheet, &params, source.date, letter)
                    .with_context(|| format!("[pipeline] Failed to load {} {letter} from sheet {sheet:?}", source.date));
                match loaded {
                    Ok(table) => {
                        tracing::debug!("[pipeline] loaded {} {letter}: {} rows", source.date, table.len());
                        propositions.push(Proposition { letter: letter.clone(), table });
                    }
                    Err(e) => {
                        tracing::error!("{e:#}");
                        failures.push(LoadFailure { date: source.date, letter: letter.clone(), error: format!("{e:#}") });
                    }
                }
            }
            elections.push(Election { date: source.date, propositions });
        }

        (Self::new(elections), failures)
    }

    #[inline] pub fn elections(&self) -> &[Election] { &self.elections }

    /// Number of (election, proposition) units.
    pub fn len(&self) -> usize {
        self.elections.iter().map(|e| e.propositions.len()).sum()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Consume the set into its raw tables, in (date, letter) order.
    pub fn into_tables(self) -> Vec<RawElectionTable> {
        self.elections.into_iter()
            .flat_map(|e| e.propositions.into_iter().map(|p| p.table))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::election::RowLabel;

    fn proposition(date: ElectionDate, letter: &str) -> Proposition {
        let rows = vec![(RowLabel::Single("PCT 1101".into()), vec![Some(1.0), Some(1.0), Some(1.0), Some(0.0)])];
        Proposition { letter: letter.into(), table: RawElectionTable::from_cells(date, letter, rows).unwrap() }
    }

    #[test]
    fn set_is_ordered_by_date_then_letter() {
        let (d1, d2): (ElectionDate, ElectionDate) = ("201511".parse().unwrap(), "199811".parse().unwrap());
        let set = ElectionSet::new(vec![
            Election { date: d1, propositions: vec![proposition(d1, "I"), proposition(d1, "D")] },
            Election { date: d2, propositions: vec![proposition(d2, "E")] },
        ]);

        assert_eq!(set.len(), 3);
        let order = set.into_tables().into_iter()
            .map(|t| format!("{}{}", t.date, t.letter))
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["199811E", "201511D", "201511I"]);
    }

    #[test]
    fn missing_workbook_is_a_unit_failure() {
        let config: PipelineConfig = toml::from_str(r#"
            input_dir = "/nonexistent"
            propositions = "props.csv"

            [[elections]]
            date = "201511"
            workbook = "201511.xlsx"
            props = { D = "Prop D" }
        "#).unwrap();

        let (set, failures) = ElectionSet::load(&config);
        assert!(set.is_empty());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].letter, "D");
    }
}
