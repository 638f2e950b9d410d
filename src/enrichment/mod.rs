/// Enrichment module
///
/// Looks keywords up in the Knowledge Graph and aggregates the entity labels.

pub mod entity_enricher;
pub mod knowledge_graph;
pub mod rate_limiter;

pub use entity_enricher::{aggregate_labels, EnrichmentResult, EntityEnricher};
pub use knowledge_graph::{EntityLookup, KnowledgeGraphClient, LookupError};
pub use rate_limiter::{SharedRateLimiter, TokenBucketLimiter};
