//! Run configuration: input locations, per-sheet layout and tolerances.

mod pipeline;
mod sheet;

pub use pipeline::{
    ApportionTolerance, CensusSource, DerivationColumns, ElectionSource, LayerSource, PipelineConfig,
};
pub use sheet::{SheetOverride, SheetParamTable, SheetParams};
