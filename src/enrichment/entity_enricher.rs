// Tags the top keywords with knowledge graph entity types
//
// Lookups run on a small worker pool behind a shared rate limit. A lookup
// that fails in any ordinary way just yields the "none" label; only a
// rejected API key stops the batch. Label counting happens once at the end,
// over the finished per-keyword lists.

use crate::config::EnrichmentConfig;
use crate::data::{EnrichedKeyword, KeywordStat, LabelFrequencyStat, NO_LABEL};
use crate::enrichment::{EntityLookup, LookupError, SharedRateLimiter};
use crate::error::{QueryIntentError, Result};
use crate::intelligence::Scorer;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

// Label stats reported by default
pub const DEFAULT_TOP_LABELS: usize = 5;

// Keyword index and its labels, as returned by a lookup task
type LookupOutcome = (usize, std::result::Result<Vec<String>, LookupError>);

/// Enriched keywords plus label statistics
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentResult {
    /// Same order as the keyword ranking
    pub keywords: Vec<EnrichedKeyword>,
    pub label_stats: Vec<LabelFrequencyStat>,
    /// Every label collected, "none" included
    pub total_entities: usize,
    pub failed_lookups: usize,
}

pub struct EntityEnricher {
    lookup: Arc<dyn EntityLookup>,
    limiter: Arc<SharedRateLimiter>,
    max_concurrent: usize,
    timeout: Duration,
    top_labels: usize,
}

impl EntityEnricher {
    pub fn new(lookup: Arc<dyn EntityLookup>, config: &EnrichmentConfig, top_labels: usize) -> Self {
        Self {
            lookup,
            limiter: Arc::new(SharedRateLimiter::new(
                config.requests_per_second,
                config.burst,
            )),
            max_concurrent: config.max_concurrent_lookups.max(1),
            timeout: Duration::from_secs(config.timeout_secs),
            top_labels,
        }
    }

    /// Per-lookup timeout, mostly for tests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Look up every keyword and aggregate the labels
    ///
    /// # Returns
    /// * `Ok(EnrichmentResult)` - one entry per keyword, in ranking order
    /// * `Err(Credential)` - the service rejected the key; remaining lookups are cancelled
    pub async fn enrich(&self, keywords: &[KeywordStat]) -> Result<EnrichmentResult> {
        let mut slots: Vec<Option<Vec<String>>> = vec![None; keywords.len()];
        let mut join_set: JoinSet<LookupOutcome> = JoinSet::new();

        for (index, stat) in keywords.iter().enumerate() {
            // wait for a free worker; a bad key surfaces here before the next spawn
            while join_set.len() >= self.max_concurrent {
                match join_set.join_next().await {
                    Some(joined) => self.store(joined, &mut slots, &mut join_set)?,
                    None => break,
                }
            }
            while let Some(joined) = join_set.try_join_next() {
                self.store(joined, &mut slots, &mut join_set)?;
            }

            let lookup = Arc::clone(&self.lookup);
            let limiter = Arc::clone(&self.limiter);
            let timeout = self.timeout;
            let keyword = stat.keyword.clone();

            join_set.spawn(async move {
                let labels = resolve_labels(lookup, limiter, timeout, &keyword).await;
                (index, labels)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            self.store(joined, &mut slots, &mut join_set)?;
        }

        let enriched: Vec<EnrichedKeyword> = keywords
            .iter()
            .zip(slots)
            .map(|(stat, labels)| {
                EnrichedKeyword::new(stat.clone(), labels.unwrap_or_else(sentinel))
            })
            .collect();

        let (label_stats, total_entities) = aggregate_labels(&enriched, self.top_labels);
        let failed_lookups = enriched.iter().filter(|k| k.is_unlabeled()).count();

        info!(
            keywords = enriched.len(),
            total_entities, failed_lookups, "enrichment finished"
        );

        Ok(EnrichmentResult {
            keywords: enriched,
            label_stats,
            total_entities,
            failed_lookups,
        })
    }

    fn store(
        &self,
        joined: std::result::Result<LookupOutcome, JoinError>,
        slots: &mut [Option<Vec<String>>],
        join_set: &mut JoinSet<LookupOutcome>,
    ) -> Result<()> {
        let (index, labels) = joined.map_err(|e| QueryIntentError::Generic(e.to_string()))?;

        match labels {
            Ok(labels) => {
                slots[index] = Some(labels);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "knowledge graph rejected the API key, stopping enrichment");
                join_set.abort_all();
                Err(QueryIntentError::Credential(e.to_string()))
            }
        }
    }
}

/// Labels for one keyword
///
/// Ordinary failures come back as `Ok(["none"])`. The only error is a
/// rejected credential.
async fn resolve_labels(
    lookup: Arc<dyn EntityLookup>,
    limiter: Arc<SharedRateLimiter>,
    timeout: Duration,
    keyword: &str,
) -> std::result::Result<Vec<String>, LookupError> {
    limiter.acquire().await;

    let outcome = match tokio::time::timeout(timeout, lookup.lookup(keyword)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(LookupError::Timeout(timeout)),
    };

    match outcome {
        Ok(labels) => {
            let labels: Vec<String> = labels.into_iter().filter(|l| !l.is_empty()).collect();
            if labels.is_empty() {
                warn!(keyword, "lookup returned no labels");
                return Ok(sentinel());
            }
            debug!(keyword, labels = ?labels, "resolved entity labels");
            Ok(labels)
        }
        Err(e) if e.is_credential() => Err(e),
        Err(e) => {
            warn!(keyword, error = %e, "lookup failed, using sentinel label");
            Ok(sentinel())
        }
    }
}

fn sentinel() -> Vec<String> {
    vec![NO_LABEL.to_string()]
}

/// Count labels across all keywords and keep the `limit` most frequent
///
/// # Returns
/// * the top labels, most frequent first (ties in first-seen order)
/// * the total number of labels collected
pub fn aggregate_labels(keywords: &[EnrichedKeyword], limit: usize) -> (Vec<LabelFrequencyStat>, usize) {
    let pool: Vec<&str> = keywords
        .iter()
        .flat_map(|k| k.labels.iter())
        .map(String::as_str)
        .filter(|label| !label.is_empty())
        .collect();

    let total = pool.len();
    let stats = Scorer::most_common(pool, limit)
        .into_iter()
        .map(|(label, count)| LabelFrequencyStat {
            label,
            count,
            percent: Scorer::percent(count, total),
        })
        .collect();

    (stats, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Canned responses keyed by keyword; anything else has no results
    struct FakeLookup {
        responses: HashMap<String, std::result::Result<Vec<String>, LookupError>>,
        calls: AtomicUsize,
    }

    impl FakeLookup {
        fn new(entries: Vec<(&str, std::result::Result<Vec<&str>, LookupError>)>) -> Self {
            let responses = entries
                .into_iter()
                .map(|(k, v)| {
                    let v = v.map(|labels| labels.into_iter().map(str::to_string).collect());
                    (k.to_string(), v)
                })
                .collect();

            Self {
                responses,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EntityLookup for FakeLookup {
        async fn lookup(&self, keyword: &str) -> std::result::Result<Vec<String>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if keyword == "slow" {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            self.responses
                .get(keyword)
                .cloned()
                .unwrap_or(Err(LookupError::NoResults))
        }
    }

    fn stats(words: &[&str]) -> Vec<KeywordStat> {
        words
            .iter()
            .map(|w| KeywordStat {
                keyword: w.to_string(),
                count: 1,
                percent: 1.0,
            })
            .collect()
    }

    fn config(concurrency: usize) -> EnrichmentConfig {
        EnrichmentConfig {
            max_concurrent_lookups: concurrency,
            requests_per_second: 1000.0,
            burst: 100,
            ..EnrichmentConfig::default()
        }
    }

    #[tokio::test]
    async fn test_enrich_keeps_ranking_order() {
        let lookup = Arc::new(FakeLookup::new(vec![
            ("google", Ok(vec!["Corporation", "Organization", "Thing"])),
            ("seo", Ok(vec!["Thing"])),
            ("nike", Ok(vec!["Organization", "Thing"])),
        ]));
        let enricher = EntityEnricher::new(lookup, &config(3), DEFAULT_TOP_LABELS);

        let result = enricher.enrich(&stats(&["google", "seo", "nike"])).await.unwrap();

        let order: Vec<&str> = result.keywords.iter().map(|k| k.stat.keyword.as_str()).collect();
        assert_eq!(order, vec!["google", "seo", "nike"]);
        assert_eq!(result.keywords[0].label_string, "Corporation,Organization,Thing");
        assert_eq!(result.total_entities, 6);
        assert_eq!(result.label_stats[0].label, "Thing");
        assert_eq!(result.label_stats[0].count, 3);
        assert_eq!(result.label_stats[0].percent, 50.0);
        assert_eq!(result.failed_lookups, 0);
    }

    #[tokio::test]
    async fn test_failures_become_sentinel() {
        let lookup = Arc::new(FakeLookup::new(vec![
            ("google", Ok(vec!["Corporation"])),
            ("broken", Err(LookupError::Malformed("bad json".to_string()))),
            ("down", Err(LookupError::Status(503))),
            ("blank", Ok(vec![""])),
        ]));
        let enricher = EntityEnricher::new(lookup, &config(2), DEFAULT_TOP_LABELS);

        let result = enricher
            .enrich(&stats(&["google", "asdkfjasldkf", "broken", "down", "blank"]))
            .await
            .unwrap();

        assert_eq!(result.keywords.len(), 5);
        assert_eq!(result.failed_lookups, 4);
        assert!(result.keywords[1].is_unlabeled());
        assert_eq!(result.label_stats[0].label, NO_LABEL);
        assert_eq!(result.label_stats[0].count, 4);
        assert_eq!(result.total_entities, 5);
    }

    #[tokio::test]
    async fn test_full_batch_keeps_every_row() {
        let lookup = Arc::new(FakeLookup::new(vec![
            ("kw0", Ok(vec!["Thing"])),
            ("kw7", Err(LookupError::Status(500))),
            ("kw21", Ok(vec!["Person", "Thing"])),
            ("kw33", Err(LookupError::Request("connection reset".to_string()))),
            ("kw49", Ok(vec!["Place"])),
        ]));
        let words: Vec<String> = (0..50).map(|i| format!("kw{}", i)).collect();
        let keywords: Vec<&str> = words.iter().map(String::as_str).collect();
        let enricher = EntityEnricher::new(lookup.clone(), &config(4), DEFAULT_TOP_LABELS);

        let result = enricher.enrich(&stats(&keywords)).await.unwrap();

        assert_eq!(result.keywords.len(), 50);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 50);
        assert_eq!(result.failed_lookups, 47);
        assert_eq!(result.keywords[21].label_string, "Person,Thing");
        assert!(result.keywords[7].is_unlabeled());
        assert_eq!(result.keywords[49].stat.keyword, "kw49");
        assert_eq!(result.total_entities, 51);
    }

    #[tokio::test]
    async fn test_timeout_becomes_sentinel() {
        let lookup = Arc::new(FakeLookup::new(vec![("fast", Ok(vec!["Thing"]))]));
        let enricher = EntityEnricher::new(lookup, &config(2), DEFAULT_TOP_LABELS)
            .with_timeout(Duration::from_millis(50));

        let result = enricher.enrich(&stats(&["slow", "fast"])).await.unwrap();

        assert!(result.keywords[0].is_unlabeled());
        assert_eq!(result.keywords[1].labels, vec!["Thing"]);
    }

    #[tokio::test]
    async fn test_credential_error_stops_batch() {
        let lookup = Arc::new(FakeLookup::new(vec![(
            "google",
            Err(LookupError::Credential("HTTP 403".to_string())),
        )]));
        let enricher = EntityEnricher::new(lookup.clone(), &config(3), DEFAULT_TOP_LABELS);

        let words: Vec<String> = (0..50).map(|i| format!("kw{}", i)).collect();
        let mut keywords: Vec<&str> = vec!["google"];
        keywords.extend(words.iter().map(String::as_str));

        let err = enricher.enrich(&stats(&keywords)).await.unwrap_err();

        assert!(matches!(err, QueryIntentError::Credential(_)));
        assert!(lookup.calls.load(Ordering::SeqCst) < keywords.len());
    }

    // A rejected key must not let a second request out when lookups are sequential
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sequential_pool_stops_after_first_rejection() {
        let words: Vec<String> = (0..50).map(|i| format!("kw{}", i)).collect();
        let keywords: Vec<&str> = words.iter().map(String::as_str).collect();

        for _ in 0..20 {
            let entries = keywords
                .iter()
                .map(|k| (*k, Err(LookupError::Credential("HTTP 403".to_string()))))
                .collect();
            let lookup = Arc::new(FakeLookup::new(entries));
            let enricher = EntityEnricher::new(lookup.clone(), &config(1), DEFAULT_TOP_LABELS);

            let err = enricher.enrich(&stats(&keywords)).await.unwrap_err();

            assert!(matches!(err, QueryIntentError::Credential(_)));
            assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_sequential_pool_matches_parallel_pool() {
        let entries = || -> Vec<(&str, std::result::Result<Vec<&str>, LookupError>)> {
            vec![
                ("a", Ok(vec!["Person", "Thing"])),
                ("b", Ok(vec!["Place", "Thing"])),
                ("c", Ok(vec!["Person"])),
            ]
        };
        let words = stats(&["a", "b", "c", "d"]);

        let one = EntityEnricher::new(Arc::new(FakeLookup::new(entries())), &config(1), 5)
            .enrich(&words)
            .await
            .unwrap();
        let many = EntityEnricher::new(Arc::new(FakeLookup::new(entries())), &config(4), 5)
            .enrich(&words)
            .await
            .unwrap();

        assert_eq!(one, many);
    }

    #[test]
    fn test_aggregate_labels_top_limit() {
        let enriched: Vec<EnrichedKeyword> = [
            vec!["Thing", "Organization"],
            vec!["Thing", "Person"],
            vec!["Thing", "Place", "City", "AdministrativeArea"],
        ]
        .into_iter()
        .zip(stats(&["a", "b", "c"]))
        .map(|(labels, stat)| {
            EnrichedKeyword::new(stat, labels.into_iter().map(str::to_string).collect())
        })
        .collect();

        let (top, total) = aggregate_labels(&enriched, 2);

        assert_eq!(total, 8);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].label, "Thing");
        assert_eq!(top[0].percent, 37.5);
        assert_eq!(top[1].label, "Organization");
    }

    #[test]
    fn test_aggregate_labels_empty() {
        let (top, total) = aggregate_labels(&[], 5);
        assert!(top.is_empty());
        assert_eq!(total, 0);
    }
}
