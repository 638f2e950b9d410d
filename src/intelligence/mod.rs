/// Intelligence module
///
/// Intent classification, part-of-speech filtering and keyword ranking, plus
/// the analyzer that runs the whole pipeline.

pub mod analyzer;
pub mod intent_classifier;
pub mod keyword_frequency;
pub mod pos_tagger;
pub mod scorer;

pub use analyzer::{AnalysisReport, Analyzer, EnrichmentStatus};
pub use intent_classifier::{Classification, IntentClassifier, KeywordRule};
pub use keyword_frequency::{KeywordFrequency, KeywordFrequencyAnalyzer};
pub use pos_tagger::{LexiconTagger, PosTag, PosTagger};
pub use scorer::Scorer;
