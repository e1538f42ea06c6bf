// src/output/mod.rs
pub mod csv;
pub mod summary;

pub use self::csv::RecordLayout;
pub use summary::{DocumentReport, RunSummary, SkippedDocument};
