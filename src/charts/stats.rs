//! Aggregates behind the three charts.

use std::collections::HashMap;

use crate::results::ResultRecord;

pub const TOP_WORDS: usize = 10;

/// Counts occurrences, ordered by descending count.
///
/// Ties keep the order in which the values were first seen.
pub fn tally<'a, I>(items: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut slots: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(&'a str, usize)> = Vec::new();

    for item in items {
        match slots.get(item) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(item, counts.len());
                counts.push((item, 1));
            }
        }
    }

    // stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(item, count)| (item.to_string(), count))
        .collect()
}

pub fn sentiment_counts(records: &[ResultRecord]) -> Vec<(String, usize)> {
    tally(records.iter().map(|r| r.sentiment.as_str()))
}

/// Share of each category in percent. Empty input gives an empty list.
pub fn proportions(counts: &[(String, usize)]) -> Vec<(String, f64)> {
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    if total == 0 {
        return Vec::new();
    }
    counts
        .iter()
        .map(|(label, count)| (label.clone(), *count as f64 * 100.0 / total as f64))
        .collect()
}

pub fn percent_label(percent: f64) -> String {
    format!("{:.1}%", percent)
}

/// Most frequent whitespace-separated tokens over all reviews.
///
/// Tokens are taken as-is: no case folding, punctuation stays attached.
pub fn top_words(records: &[ResultRecord], limit: usize) -> Vec<(String, usize)> {
    let mut words = tally(records.iter().flat_map(|r| r.review.split_whitespace()));
    words.truncate(limit);
    words
}
