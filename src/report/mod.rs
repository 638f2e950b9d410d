/// Report module
///
/// Builds the output tables and writes them to disk.

pub mod assembler;
pub mod export;

pub use assembler::{IntentRow, IntentTable, KeywordRow, KeywordTable, ReportAssembler};
pub use export::{save_intent_table, save_keyword_table};
