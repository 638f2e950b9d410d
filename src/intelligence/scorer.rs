/// Counting and percentage helpers
///
/// Shared by the classifier, the keyword counter and the label aggregation.

use std::collections::HashMap;

/// Scorer for frequency counts and percentages
pub struct Scorer;

impl Scorer {
    /// Percentage of `count` over `total`, rounded to one decimal
    ///
    /// # Returns
    /// * 0.0 when `total` is zero
    pub fn percent(count: usize, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }

        Self::round_one_decimal(count as f64 / total as f64 * 100.0)
    }

    /// Round to one decimal place, halves away from zero
    pub fn round_one_decimal(value: f64) -> f64 {
        (value * 10.0).round() / 10.0
    }

    /// The `limit` most frequent items, most frequent first
    ///
    /// Items with equal counts keep the order they were first seen in, so
    /// the same input always ranks the same way.
    pub fn most_common<I, S>(items: I, limit: usize) -> Vec<(String, usize)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut first_seen: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();

        for item in items {
            let item = item.as_ref();
            match counts.get_mut(item) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(item.to_string(), 1);
                    first_seen.push(item.to_string());
                }
            }
        }

        let mut ranked: Vec<(String, usize)> = first_seen
            .into_iter()
            .map(|item| {
                let count = counts[&item];
                (item, count)
            })
            .collect();

        // stable, so ties stay in first-seen order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit);

        ranked
    }
}
