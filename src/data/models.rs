/// Data models for a single analysis run
///
/// Everything here is a plain value produced once per run and never mutated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label substituted when a keyword lookup fails or finds nothing
pub const NO_LABEL: &str = "none";

/// One row of a Search Console query export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub query: String,
    pub clicks: u64,
    pub impressions: u64,
    pub ctr: f64, // percent points, "12.5%" -> 12.5
    pub position: f64,
}

/// Intent categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    Informational,
    Transactional,
    Commercial,
    Custom,
    Unclassified,
}

impl IntentCategory {
    /// Categories that can appear in the intent table, in concatenation order
    pub const TAGGED: [IntentCategory; 4] = [
        IntentCategory::Informational,
        IntentCategory::Transactional,
        IntentCategory::Commercial,
        IntentCategory::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentCategory::Informational => "Informational",
            IntentCategory::Transactional => "Transactional",
            IntentCategory::Commercial => "Commercial",
            IntentCategory::Custom => "Custom",
            IntentCategory::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A query with the intent it was assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedQuery {
    pub record: QueryRecord,
    pub intent: IntentCategory,
}

/// How many input queries matched a category (before dedup)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub category: IntentCategory,
    pub count: usize,
    pub percent: f64,
}

/// A noun/verb keyword and how often it occurs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordStat {
    pub keyword: String,
    pub count: usize,
    pub percent: f64,
}

/// A keyword with the entity types the knowledge graph returned for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedKeyword {
    pub stat: KeywordStat,
    pub labels: Vec<String>,
    pub label_string: String,
}

impl EnrichedKeyword {
    pub fn new(stat: KeywordStat, labels: Vec<String>) -> Self {
        let label_string = labels.join(",");

        Self {
            stat,
            labels,
            label_string,
        }
    }

    /// True when the lookup fell back to the sentinel label
    pub fn is_unlabeled(&self) -> bool {
        self.labels.len() == 1 && self.labels[0] == NO_LABEL
    }
}

/// How often an entity label was seen across all enriched keywords
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelFrequencyStat {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}
