mod error;
mod fs;
mod report;

pub use error::Error;
pub use report::{QualityReport, Warning};
pub(crate) use fs::*;
