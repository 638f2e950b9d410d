// Counts the nouns and verbs people search for
//
// All queries become one long word sequence, the tagger labels it in a
// single pass, and only noun/verb tokens are counted. Words are counted
// exactly as typed: "SEO" and "seo" are different keywords.

use crate::data::KeywordStat;
use crate::error::{QueryIntentError, Result};
use crate::intelligence::{PosTagger, Scorer};
use std::sync::Arc;
use tracing::{debug, info};

// How many keywords the frequency table keeps by default
pub const DEFAULT_TOP_KEYWORDS: usize = 50;

/// Ranked keywords plus the counts behind the percentages
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordFrequency {
    pub keywords: Vec<KeywordStat>,
    /// Noun/verb tokens, the percentage denominator
    pub total_tokens: usize,
    /// Every whitespace-separated token before filtering
    pub corpus_tokens: usize,
}

pub struct KeywordFrequencyAnalyzer {
    tagger: Arc<dyn PosTagger>,
    top_n: usize,
}

impl KeywordFrequencyAnalyzer {
    pub fn new(tagger: Arc<dyn PosTagger>, top_n: usize) -> Self {
        Self { tagger, top_n }
    }

    /// Whitespace tokens of every query, in input order
    pub fn tokenize<S: AsRef<str>>(queries: &[S]) -> Vec<String> {
        queries
            .iter()
            .flat_map(|q| q.as_ref().split_whitespace())
            .map(str::to_string)
            .collect()
    }

    /// Rank the most frequent noun/verb keywords
    ///
    /// # Returns
    /// * `Ok(KeywordFrequency)` - up to `top_n` keywords, most frequent first,
    ///   ties in first-seen order
    /// * `Err(NoKeywords)` - nothing survived the noun/verb filter
    /// * `Err(Tagging)` - the tagger did not return one tag per token
    pub fn analyze<S: AsRef<str>>(&self, queries: &[S]) -> Result<KeywordFrequency> {
        let tokens = Self::tokenize(queries);
        let tags = self.tagger.tag(&tokens)?;

        if tags.len() != tokens.len() {
            return Err(QueryIntentError::Tagging(format!(
                "tagger returned {} tags for {} tokens",
                tags.len(),
                tokens.len()
            )));
        }

        let kept: Vec<&str> = tokens
            .iter()
            .zip(&tags)
            .filter(|(_, tag)| tag.is_keyword_class())
            .map(|(token, _)| token.as_str())
            .collect();

        let total_tokens = kept.len();
        debug!(
            corpus_tokens = tokens.len(),
            total_tokens, "filtered tokens to nouns and verbs"
        );

        if total_tokens == 0 {
            return Err(QueryIntentError::NoKeywords(tokens.len()));
        }

        let keywords: Vec<KeywordStat> = Scorer::most_common(kept, self.top_n)
            .into_iter()
            .map(|(keyword, count)| KeywordStat {
                keyword,
                count,
                percent: Scorer::percent(count, total_tokens),
            })
            .collect();

        info!(keywords = keywords.len(), total_tokens, "ranked keywords");

        Ok(KeywordFrequency {
            keywords,
            total_tokens,
            corpus_tokens: tokens.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::{LexiconTagger, PosTag};

    fn analyzer(top_n: usize) -> KeywordFrequencyAnalyzer {
        KeywordFrequencyAnalyzer::new(Arc::new(LexiconTagger::new()), top_n)
    }

    // Tags every token with the same class
    struct FixedTagger(PosTag);

    impl PosTagger for FixedTagger {
        fn tag(&self, tokens: &[String]) -> Result<Vec<PosTag>> {
            Ok(vec![self.0; tokens.len()])
        }
    }

    struct ShortTagger;

    impl PosTagger for ShortTagger {
        fn tag(&self, _tokens: &[String]) -> Result<Vec<PosTag>> {
            Ok(vec![PosTag::Noun])
        }
    }

    #[test]
    fn test_counts_nouns_and_verbs_only() {
        let queries = ["what is seo", "seo tools", "buy cheap shoes", "seo"];

        let result = analyzer(50).analyze(&queries).unwrap();

        // seo x3, tools, buy, shoes
        assert_eq!(result.total_tokens, 6);
        assert_eq!(result.corpus_tokens, 9);
        assert_eq!(result.keywords[0].keyword, "seo");
        assert_eq!(result.keywords[0].count, 3);
        assert_eq!(result.keywords[0].percent, 50.0);
        assert!(result.keywords.iter().all(|k| k.keyword != "what" && k.keyword != "cheap"));
    }

    #[test]
    fn test_top_n_and_tie_order() {
        let queries = ["zebra apple", "mango apple zebra", "kiwi"];

        let result = analyzer(2).analyze(&queries).unwrap();
        let words: Vec<&str> = result.keywords.iter().map(|k| k.keyword.as_str()).collect();

        assert_eq!(words, vec!["zebra", "apple"]);
        assert_eq!(result.total_tokens, 6);
    }

    #[test]
    fn test_no_normalization() {
        let queries = ["Shoes shoes shoes,"];
        let tagger = Arc::new(FixedTagger(PosTag::Noun));

        let result = KeywordFrequencyAnalyzer::new(tagger, 50).analyze(&queries).unwrap();

        assert_eq!(result.keywords.len(), 3);
    }

    #[test]
    fn test_percentages_never_exceed_hundred() {
        let queries = ["seo tools", "seo audit", "backlink tools", "rank tracker"];

        let result = analyzer(50).analyze(&queries).unwrap();
        let sum: f64 = result.keywords.iter().map(|k| k.percent).sum();

        assert!(sum <= 100.0 + 1e-9);
        assert!(result.keywords.iter().all(|k| k.count > 0));
    }

    #[test]
    fn test_stop_words_only_is_no_keywords() {
        let queries = ["what is the", "how to", "and or"];

        let err = analyzer(50).analyze(&queries).unwrap_err();

        assert!(matches!(err, QueryIntentError::NoKeywords(7)));
    }

    #[test]
    fn test_empty_corpus_is_no_keywords() {
        let queries: [&str; 2] = ["", "   "];
        let err = analyzer(50).analyze(&queries).unwrap_err();

        assert!(matches!(err, QueryIntentError::NoKeywords(0)));
    }

    #[test]
    fn test_tag_count_mismatch_is_tagging_error() {
        let queries = ["seo tools"];
        let err = KeywordFrequencyAnalyzer::new(Arc::new(ShortTagger), 50)
            .analyze(&queries)
            .unwrap_err();

        assert!(matches!(err, QueryIntentError::Tagging(_)));
    }
}
