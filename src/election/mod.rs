mod canonical;
mod consolidate;
mod index;
mod proposition;
mod table;
mod verify;

pub use canonical::{canonical_id, canonicalize, split_combined};
pub use consolidate::consolidate;
pub use index::{ballot_type_from_label, ballot_type_from_registered, is_descriptive, normalize_index, precinct_from_label};
pub use proposition::{NimbyVote, PropositionTable};
pub use table::{
    BallotType, ConsolidatedPrecinctRow, NormalizedPrecinctRow, PrecinctTable,
    RawElectionTable, RawRow, RowLabel, VALUE_COLUMNS,
};
pub use verify::{vote_totals_dataframe, VoteTotal};
