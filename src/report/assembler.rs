/// Report assembly
///
/// Turns classifier and enricher output into the two tables the tool
/// produces. No analysis happens here, only projection and ordering.

use crate::data::{CategoryStat, LabelFrequencyStat};
use crate::enrichment::EnrichmentResult;
use crate::intelligence::{Classification, KeywordFrequency};
use serde::Serialize;

/// Row of the query intent table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentRow {
    pub query: String,
    pub clicks: u64,
    pub impressions: u64,
    pub intent: String,
    pub ctr: f64,
    pub position: f64,
}

/// Row of the keyword frequency / entity table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordRow {
    pub keyword: String,
    pub count: usize,
    pub percent: f64,
    pub entity_labels: String,
}

/// Table 1: one row per classified query, clicks descending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentTable {
    pub total_queries: usize,
    pub categories: Vec<CategoryStat>,
    pub rows: Vec<IntentRow>,
}

/// Table 2: enriched keywords, most frequent first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordTable {
    pub total_tokens: usize,
    pub total_entities: usize,
    pub top_labels: Vec<LabelFrequencyStat>,
    pub rows: Vec<KeywordRow>,
}

pub struct ReportAssembler;

impl ReportAssembler {
    pub fn intent_table(classification: &Classification) -> IntentTable {
        let mut rows: Vec<IntentRow> = classification
            .queries
            .iter()
            .map(|q| IntentRow {
                query: q.record.query.clone(),
                clicks: q.record.clicks,
                impressions: q.record.impressions,
                intent: q.intent.to_string(),
                ctr: q.record.ctr,
                position: q.record.position,
            })
            .collect();

        rows.sort_by(|a, b| b.clicks.cmp(&a.clicks));

        IntentTable {
            total_queries: classification.total_queries,
            categories: classification.category_stats.clone(),
            rows,
        }
    }

    pub fn keyword_table(frequency: &KeywordFrequency, enrichment: &EnrichmentResult) -> KeywordTable {
        let mut rows: Vec<KeywordRow> = enrichment
            .keywords
            .iter()
            .map(|k| KeywordRow {
                keyword: k.stat.keyword.clone(),
                count: k.stat.count,
                percent: k.stat.percent,
                entity_labels: k.label_string.clone(),
            })
            .collect();

        rows.sort_by(|a, b| b.count.cmp(&a.count));

        KeywordTable {
            total_tokens: frequency.total_tokens,
            total_entities: enrichment.total_entities,
            top_labels: enrichment.label_stats.clone(),
            rows,
        }
    }

    /// `Informational: 3 | 30.0%`
    pub fn category_line(stat: &CategoryStat) -> String {
        format!("{}: {} | {:.1}%", stat.category, stat.count, stat.percent)
    }

    /// `Organization: 12 | 24.0%`
    pub fn label_line(stat: &LabelFrequencyStat) -> String {
        format!("{}: {} | {:.1}%", stat.label, stat.count, stat.percent)
    }
}
