/// query-intent library
///
/// Intent labelling, keyword frequency and entity enrichment for search
/// query exports.

pub mod config;
pub mod data;
pub mod enrichment;
pub mod error;
pub mod intelligence;
pub mod report;

// Re-exports for convenience
pub use config::AnalysisConfig;
pub use error::{QueryIntentError, Result};
pub use intelligence::{AnalysisReport, Analyzer};
