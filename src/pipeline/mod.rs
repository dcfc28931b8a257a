//! Orchestration of a full run: load, transform each unit, assemble, persist.

mod apportion;
mod context;
mod election;
mod run;
pub mod stage;

pub use apportion::{apportion_all, read_apportioned};
pub use context::TransformContext;
pub use election::{Election, ElectionSet, LoadFailure, Proposition};
pub use run::{analyze, load_propositions, transform_unit, AnalysisRun, RunSummary, UnitOutput, UnitSummary};
