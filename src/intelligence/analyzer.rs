/// Main analyzer orchestrator
///
/// Runs classification, keyword ranking and entity enrichment over one
/// export. The intent table is always produced once the input is readable;
/// the keyword table depends on enrichment being enabled and succeeding.

use crate::config::AnalysisConfig;
use crate::data::QueryRecord;
use crate::enrichment::{EntityEnricher, KnowledgeGraphClient};
use crate::error::{QueryIntentError, Result};
use crate::intelligence::{
    IntentClassifier, KeywordFrequency, KeywordFrequencyAnalyzer, LexiconTagger, PosTagger,
};
use crate::report::{IntentTable, KeywordTable, ReportAssembler};
use std::sync::Arc;
use tracing::{error, info, warn};

/// How the enrichment stage is set up for this run
enum EnrichmentSetup {
    Disabled,
    Ready(EntityEnricher),
    Invalid(String), // malformed key, reported instead of the keyword table
}

/// What happened to the keyword/entity table
#[derive(Debug)]
pub enum EnrichmentStatus {
    /// No API key given
    Disabled,
    /// Nothing survived the noun/verb filter
    NoKeywords { corpus_tokens: usize },
    Completed(KeywordTable),
    /// Bad key or tagging failure; the intent table is still valid
    Failed(QueryIntentError),
}

/// Analysis report
#[derive(Debug)]
pub struct AnalysisReport {
    pub intent: IntentTable,
    pub enrichment: EnrichmentStatus,
}

impl AnalysisReport {
    pub fn keyword_table(&self) -> Option<&KeywordTable> {
        match &self.enrichment {
            EnrichmentStatus::Completed(table) => Some(table),
            _ => None,
        }
    }
}

/// Main analyzer
pub struct Analyzer {
    classifier: IntentClassifier,
    frequency: KeywordFrequencyAnalyzer,
    enrichment: EnrichmentSetup,
}

impl Analyzer {
    /// Build the pipeline from config, with the built-in tagger and the HTTP client
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let classifier =
            IntentClassifier::new(&config.custom_keywords)?.with_precedence(config.precedence.clone());
        let tagger = LexiconTagger::new().with_entries(config.lexicon_entries()?);
        let frequency = KeywordFrequencyAnalyzer::new(Arc::new(tagger), config.top_keywords);

        let enrichment = match config.enrichment_key() {
            None => EnrichmentSetup::Disabled,
            Some(key) => match KnowledgeGraphClient::new(key, &config.enrichment) {
                Ok(client) => EnrichmentSetup::Ready(EntityEnricher::new(
                    Arc::new(client),
                    &config.enrichment,
                    config.top_labels,
                )),
                Err(QueryIntentError::Config(msg)) => EnrichmentSetup::Invalid(msg),
                Err(e) => return Err(e),
            },
        };

        Ok(Self {
            classifier,
            frequency,
            enrichment,
        })
    }

    /// Assemble from parts, e.g. a different tagger or lookup
    pub fn with_parts(
        classifier: IntentClassifier,
        tagger: Arc<dyn PosTagger>,
        top_keywords: usize,
        enricher: Option<EntityEnricher>,
    ) -> Self {
        Self {
            classifier,
            frequency: KeywordFrequencyAnalyzer::new(tagger, top_keywords),
            enrichment: match enricher {
                Some(enricher) => EnrichmentSetup::Ready(enricher),
                None => EnrichmentSetup::Disabled,
            },
        }
    }

    /// Run the full pipeline
    ///
    /// # Returns
    /// * `Ok(AnalysisReport)` - intent table plus the enrichment outcome
    /// * `Err(EmptyInput)` - no records at all
    pub async fn analyze(&self, records: &[QueryRecord]) -> Result<AnalysisReport> {
        if records.is_empty() {
            return Err(QueryIntentError::EmptyInput);
        }

        let classification = self.classifier.classify(records);
        let intent = ReportAssembler::intent_table(&classification);
        info!(
            total_queries = intent.total_queries,
            classified = intent.rows.len(),
            "classified queries"
        );

        let enrichment = match &self.enrichment {
            EnrichmentSetup::Disabled => EnrichmentStatus::Disabled,
            EnrichmentSetup::Invalid(msg) => {
                error!(reason = %msg, "enrichment disabled by invalid API key");
                EnrichmentStatus::Failed(QueryIntentError::Config(msg.clone()))
            }
            EnrichmentSetup::Ready(enricher) => self.enrich(enricher, records).await,
        };

        Ok(AnalysisReport { intent, enrichment })
    }

    /// Keyword ranking only, no lookups
    pub fn keywords(&self, records: &[QueryRecord]) -> Result<KeywordFrequency> {
        if records.is_empty() {
            return Err(QueryIntentError::EmptyInput);
        }

        let queries: Vec<&str> = records.iter().map(|r| r.query.as_str()).collect();
        self.frequency.analyze(&queries)
    }

    async fn enrich(&self, enricher: &EntityEnricher, records: &[QueryRecord]) -> EnrichmentStatus {
        let frequency = match self.keywords(records) {
            Ok(frequency) => frequency,
            Err(QueryIntentError::NoKeywords(corpus_tokens)) => {
                warn!(corpus_tokens, "no nouns or verbs to enrich");
                return EnrichmentStatus::NoKeywords { corpus_tokens };
            }
            Err(e) => return EnrichmentStatus::Failed(e),
        };

        match enricher.enrich(&frequency.keywords).await {
            Ok(result) => {
                EnrichmentStatus::Completed(ReportAssembler::keyword_table(&frequency, &result))
            }
            Err(e) => EnrichmentStatus::Failed(e),
        }
    }
}
