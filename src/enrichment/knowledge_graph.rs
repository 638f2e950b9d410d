/// Google Knowledge Graph Search lookups
///
/// `EntityLookup` is what the enricher consumes: one keyword in, the entity
/// type labels of the best match out. `KnowledgeGraphClient` does it over HTTP.

use crate::config::EnrichmentConfig;
use crate::error::{QueryIntentError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Why a single keyword lookup produced no labels
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("no results")]
    NoResults,

    /// The service refused the API key. Fatal to the whole enrichment stage.
    #[error("API key rejected: {0}")]
    Credential(String),
}

impl LookupError {
    pub fn is_credential(&self) -> bool {
        matches!(self, LookupError::Credential(_))
    }
}

/// Single-result entity search
#[async_trait]
pub trait EntityLookup: Send + Sync {
    /// Type labels of the top result for `keyword`, e.g. `["Corporation", "Organization", "Thing"]`
    async fn lookup(&self, keyword: &str) -> std::result::Result<Vec<String>, LookupError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "itemListElement")]
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    result: Option<EntityResult>,
}

#[derive(Debug, Deserialize)]
struct EntityResult {
    #[serde(rename = "@type")]
    types: Option<Vec<String>>,
}

/// Pull `itemListElement[0].result["@type"]` out of a search response body
pub fn parse_labels(body: &str) -> std::result::Result<Vec<String>, LookupError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;

    let items = response
        .items
        .ok_or_else(|| LookupError::Malformed("missing itemListElement".to_string()))?;

    let first = items.into_iter().next().ok_or(LookupError::NoResults)?;

    first
        .result
        .and_then(|result| result.types)
        .ok_or_else(|| LookupError::Malformed("missing result @type".to_string()))
}

/// Reject keys that cannot possibly be valid before any request goes out
pub fn validate_api_key(api_key: &str) -> Result<()> {
    if api_key.is_empty() {
        return Err(QueryIntentError::Config("API key is empty".to_string()));
    }

    if !api_key.chars().all(|c| c.is_ascii_graphic()) {
        return Err(QueryIntentError::Config(
            "API key contains whitespace or non-printable characters".to_string(),
        ));
    }

    Ok(())
}

/// HTTP client for the Knowledge Graph Search API
pub struct KnowledgeGraphClient {
    http: Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl KnowledgeGraphClient {
    pub fn new(api_key: &str, config: &EnrichmentConfig) -> Result<Self> {
        validate_api_key(api_key)?;

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: api_key.to_string(),
            timeout,
        })
    }
}

#[async_trait]
impl EntityLookup for KnowledgeGraphClient {
    async fn lookup(&self, keyword: &str) -> std::result::Result<Vec<String>, LookupError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("query", keyword), ("key", self.api_key.as_str()), ("limit", "1")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Timeout(self.timeout)
                } else {
                    LookupError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;

        debug!(keyword, status = status.as_u16(), "knowledge graph response");

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        parse_labels(&body)
    }
}

// 401/403 always mean the key; Google answers a bad key with 400 too
fn classify_status(status: StatusCode, body: &str) -> LookupError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LookupError::Credential(format!("HTTP {}", status.as_u16()))
        }
        StatusCode::BAD_REQUEST if body.contains("API key") => {
            LookupError::Credential("API key not valid".to_string())
        }
        _ => LookupError::Status(status.as_u16()),
    }
}
