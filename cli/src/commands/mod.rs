pub mod analyze;
pub mod apportion;
pub mod sheets;
