/// Error types for query-intent
///
/// This module defines all possible errors that can occur in the application.
/// Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Main error type for query-intent operations
#[derive(Error, Debug)]
pub enum QueryIntentError {
    /// I/O errors (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is missing from the input header
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A data row could not be parsed
    #[error("Invalid record at row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },

    /// Input file has a header but no data rows
    #[error("Input contains no query rows")]
    EmptyInput,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The knowledge graph rejected the API key
    #[error("Credential error: {0}")]
    Credential(String),

    /// Part-of-speech tagging failed
    #[error("Tagging error: {0}")]
    Tagging(String),

    /// Nothing survived part-of-speech filtering
    #[error("No noun or verb keywords found in {0} tokens")]
    NoKeywords(usize),

    /// HTTP client construction failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A keyword list could not be compiled into a pattern
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for query-intent operations
pub type Result<T> = std::result::Result<T, QueryIntentError>;

impl QueryIntentError {
    /// Convert to a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            QueryIntentError::Io(e) => {
                format!("File system error. Check the path and permissions. Details: {}", e)
            }
            QueryIntentError::Csv(e) => {
                format!("Could not read the CSV file. Details: {}", e)
            }
            QueryIntentError::MissingColumn(column) => {
                format!("The export has no '{}' column. Is this a Search Console query export?", column)
            }
            QueryIntentError::InvalidRecord { row, reason } => {
                format!("Row {} could not be read: {}", row, reason)
            }
            QueryIntentError::EmptyInput => "The export contains no queries".to_string(),
            QueryIntentError::Config(msg) => {
                format!("Configuration issue: {}", msg)
            }
            QueryIntentError::Credential(msg) => {
                format!("Knowledge Graph API key was rejected: {}", msg)
            }
            QueryIntentError::Tagging(msg) => {
                format!("Part-of-speech tagging failed: {}", msg)
            }
            QueryIntentError::NoKeywords(total) => {
                format!("No nouns or verbs found among {} words, keyword table skipped", total)
            }
            QueryIntentError::Http(e) => {
                format!("HTTP client error. Details: {}", e)
            }
            QueryIntentError::Serialization(e) => {
                format!("Data format error: {}", e)
            }
            QueryIntentError::Pattern(e) => {
                format!("Intent keyword list is not usable: {}", e)
            }
            QueryIntentError::Generic(msg) => msg.clone(),
        }
    }

    /// Input errors stop the whole run before any table is produced
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            QueryIntentError::Io(_)
                | QueryIntentError::Csv(_)
                | QueryIntentError::MissingColumn(_)
                | QueryIntentError::InvalidRecord { .. }
                | QueryIntentError::EmptyInput
        )
    }
}
