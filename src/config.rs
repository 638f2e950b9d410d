/// Configuration for an analysis run
///
/// Defaults come first, then an optional JSON file, then whatever the CLI
/// passes in. Everything is checked once by `validate` before a run starts.

use crate::data::IntentCategory;
use crate::error::{QueryIntentError, Result};
use crate::intelligence::PosTag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "https://kgsearch.googleapis.com/v1/entities:search";

// One lookup every ~17 minutes; anything slower is a typo
pub const MIN_REQUESTS_PER_SECOND: f64 = 1e-3;

// Search Console export header names
const DEFAULT_QUERY_COLUMN: &str = "Top queries";
const DEFAULT_CLICKS_COLUMN: &str = "Clicks";
const DEFAULT_IMPRESSIONS_COLUMN: &str = "Impressions";
const DEFAULT_CTR_COLUMN: &str = "CTR";
const DEFAULT_POSITION_COLUMN: &str = "Position";

/// Which CSV header holds which field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub query: String,
    pub clicks: String,
    pub impressions: String,
    pub ctr: String,
    pub position: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY_COLUMN.to_string(),
            clicks: DEFAULT_CLICKS_COLUMN.to_string(),
            impressions: DEFAULT_IMPRESSIONS_COLUMN.to_string(),
            ctr: DEFAULT_CTR_COLUMN.to_string(),
            position: DEFAULT_POSITION_COLUMN.to_string(),
        }
    }
}

/// How a query matching several categories picks its row
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// Highest clicks wins, equal clicks fall back to category order
    #[default]
    ClickOrder,
    /// Fixed ranking, first listed category wins
    Ranked(Vec<IntentCategory>),
}

/// Knowledge graph lookup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub endpoint: String,
    pub max_concurrent_lookups: usize,
    pub requests_per_second: f64,
    pub burst: u32,
    pub timeout_secs: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_concurrent_lookups: 4,
            requests_per_second: 10.0,
            burst: 10,
            timeout_secs: 10,
        }
    }
}

/// Everything one run needs to know
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub columns: ColumnMapping,
    pub custom_keywords: Vec<String>,
    pub api_key: Option<String>,
    pub top_keywords: usize,
    pub top_labels: usize,
    pub precedence: Precedence,
    pub enrichment: EnrichmentConfig,
    /// Extra tagger words, e.g. `{"seo": "NN", "nike": "NNP"}` (Penn codes)
    pub lexicon: BTreeMap<String, String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            custom_keywords: vec!["google".to_string()],
            api_key: None,
            top_keywords: 50,
            top_labels: 5,
            precedence: Precedence::default(),
            enrichment: EnrichmentConfig::default(),
            lexicon: BTreeMap::new(),
        }
    }
}

impl AnalysisConfig {
    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// `~/.query-intent/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".query-intent").join("config.json"))
    }

    /// Load from an explicit path, else the default path if it exists, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// The API key, if enrichment was asked for. Blank counts as not set.
    pub fn enrichment_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Lexicon overrides as tagger entries
    pub fn lexicon_entries(&self) -> Result<Vec<(String, PosTag)>> {
        self.lexicon
            .iter()
            .map(|(word, code)| match PosTag::from_penn(code.trim()) {
                Some(tag) => Ok((word.clone(), tag)),
                None => Err(QueryIntentError::Config(format!(
                    "lexicon entry '{}' has unknown tag '{}'",
                    word, code
                ))),
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_keywords == 0 {
            return Err(QueryIntentError::Config(
                "top_keywords must be at least 1".to_string(),
            ));
        }
        if self.top_labels == 0 {
            return Err(QueryIntentError::Config(
                "top_labels must be at least 1".to_string(),
            ));
        }

        let enrichment = &self.enrichment;
        if enrichment.max_concurrent_lookups == 0 {
            return Err(QueryIntentError::Config(
                "max_concurrent_lookups must be at least 1".to_string(),
            ));
        }
        if !(enrichment.requests_per_second >= MIN_REQUESTS_PER_SECOND)
            || !enrichment.requests_per_second.is_finite()
        {
            return Err(QueryIntentError::Config(format!(
                "requests_per_second must be a finite number of at least {}",
                MIN_REQUESTS_PER_SECOND
            )));
        }
        if enrichment.burst == 0 {
            return Err(QueryIntentError::Config("burst must be at least 1".to_string()));
        }
        if enrichment.timeout_secs == 0 {
            return Err(QueryIntentError::Config(
                "timeout_secs must be at least 1".to_string(),
            ));
        }

        self.lexicon_entries()?;

        if let Precedence::Ranked(order) = &self.precedence {
            let complete = order.len() == IntentCategory::TAGGED.len()
                && IntentCategory::TAGGED.iter().all(|c| order.contains(c));
            if !complete {
                return Err(QueryIntentError::Config(
                    "ranked precedence must list informational, transactional, commercial and custom exactly once"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Split a comma separated keyword list, dropping blanks
///
/// `"google,"` gives `["google"]`, never an empty keyword.
pub fn parse_keyword_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}
