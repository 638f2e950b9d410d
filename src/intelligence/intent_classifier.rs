// Tags each query with an intent category
//
// Every category is a keyword list. A query belongs to a category when its
// text contains any of the keywords (case-sensitive, plain substring). One
// query can land in several categories; the table keeps only one row for it.

use crate::config::Precedence;
use crate::data::{CategoryStat, ClassifiedQuery, IntentCategory, QueryRecord};
use crate::error::Result;
use crate::intelligence::Scorer;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

pub const INFORMATIONAL_KEYWORDS: &[&str] = &["what", "who", "when", "where", "which", "why", "how"];

pub const TRANSACTIONAL_KEYWORDS: &[&str] = &[
    "buy", "order", "purchase", "cheap", "price", "discount", "shop", "sale", "offer",
];

pub const COMMERCIAL_KEYWORDS: &[&str] = &[
    "best",
    "top",
    "review",
    "comparison",
    "compare",
    "vs",
    "versus",
    "guide",
    "ultimate",
];

/// One category and the compiled alternation of its keywords
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub category: IntentCategory,
    pattern: Option<Regex>, // None when the list had no usable keyword
}

impl KeywordRule {
    pub fn new<S: AsRef<str>>(category: IntentCategory, keywords: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();

        let pattern = if alternatives.is_empty() {
            None
        } else {
            Some(Regex::new(&alternatives.join("|"))?)
        };

        Ok(Self { category, pattern })
    }

    pub fn matches(&self, query: &str) -> bool {
        self.pattern
            .as_ref()
            .map(|pattern| pattern.is_match(query))
            .unwrap_or(false)
    }
}

/// Output of a classification pass
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// One row per distinct query, clicks descending
    pub queries: Vec<ClassifiedQuery>,
    /// Per-category matches before dedup, in rule order
    pub category_stats: Vec<CategoryStat>,
    /// Every input row, matched or not
    pub total_queries: usize,
}

pub struct IntentClassifier {
    rules: Vec<KeywordRule>,
    precedence: Precedence,
}

impl IntentClassifier {
    /// Built-in informational, transactional and commercial lists plus a custom one
    pub fn new<S: AsRef<str>>(custom_keywords: &[S]) -> Result<Self> {
        let rules = vec![
            KeywordRule::new(IntentCategory::Informational, INFORMATIONAL_KEYWORDS)?,
            KeywordRule::new(IntentCategory::Transactional, TRANSACTIONAL_KEYWORDS)?,
            KeywordRule::new(IntentCategory::Commercial, COMMERCIAL_KEYWORDS)?,
            KeywordRule::new(IntentCategory::Custom, custom_keywords)?,
        ];

        Ok(Self::with_rules(rules))
    }

    /// Rules are concatenated in the order given
    pub fn with_rules(rules: Vec<KeywordRule>) -> Self {
        Self {
            rules,
            precedence: Precedence::default(),
        }
    }

    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    /// Classify every record
    ///
    /// Matches are concatenated category by category, ordered by clicks
    /// (highest first, ties keep concatenation order) and deduplicated by
    /// query text with the first copy kept. Unmatched records are left out
    /// of the table but still count toward `total_queries`.
    pub fn classify(&self, records: &[QueryRecord]) -> Classification {
        let total_queries = records.len();

        let mut tagged: Vec<ClassifiedQuery> = Vec::new();
        let mut category_stats = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            let before = tagged.len();
            tagged.extend(
                records
                    .iter()
                    .filter(|record| rule.matches(&record.query))
                    .map(|record| ClassifiedQuery {
                        record: record.clone(),
                        intent: rule.category,
                    }),
            );

            let count = tagged.len() - before;
            debug!(category = %rule.category, count, "matched intent rule");

            category_stats.push(CategoryStat {
                category: rule.category,
                count,
                percent: Scorer::percent(count, total_queries),
            });
        }

        let queries = match &self.precedence {
            Precedence::ClickOrder => {
                tagged.sort_by(|a, b| b.record.clicks.cmp(&a.record.clicks));
                dedup_first_wins(tagged)
            }
            Precedence::Ranked(order) => {
                let rank = |category: IntentCategory| {
                    order
                        .iter()
                        .position(|c| *c == category)
                        .unwrap_or(order.len())
                };
                tagged.sort_by_key(|q| rank(q.intent));
                let mut kept = dedup_first_wins(tagged);
                kept.sort_by(|a, b| b.record.clicks.cmp(&a.record.clicks));
                kept
            }
        };

        Classification {
            queries,
            category_stats,
            total_queries,
        }
    }

    /// The category `classify` would give a single query
    ///
    /// Under click order that is the first matching rule; under a ranked
    /// policy, the best-ranked matching category.
    pub fn category_of(&self, query: &str) -> IntentCategory {
        let matching = self.rules.iter().filter(|rule| rule.matches(query));

        let best = match &self.precedence {
            Precedence::ClickOrder => matching.map(|rule| rule.category).next(),
            Precedence::Ranked(order) => matching
                .map(|rule| rule.category)
                .min_by_key(|category| {
                    order
                        .iter()
                        .position(|c| c == category)
                        .unwrap_or(order.len())
                }),
        };

        best.unwrap_or(IntentCategory::Unclassified)
    }
}

fn dedup_first_wins(tagged: Vec<ClassifiedQuery>) -> Vec<ClassifiedQuery> {
    let mut seen: HashSet<String> = HashSet::new();

    tagged
        .into_iter()
        .filter(|q| seen.insert(q.record.query.clone()))
        .collect()
}
