/// Data module for query-intent
///
/// Holds the value types a run produces and reads Search Console exports.

pub mod models;
pub mod reader;

pub use models::*;
pub use reader::QueryReader;
