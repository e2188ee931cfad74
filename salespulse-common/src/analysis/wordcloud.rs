//! Word-frequency cloud for the manager dashboard

use super::word_tokens;
use serde::Serialize;
use std::collections::HashMap;

/// Words never shown in the cloud
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "is", "was", "are",
    "were", "of", "with", "it", "this", "that", "we", "i", "they",
];

/// Maximum number of cloud entries
pub const WORDCLOUD_LIMIT: usize = 50;

/// Tokens of this many characters or fewer are dropped
pub const MIN_WORD_CHARS: usize = 2;

/// More High-label texts than this and the cloud uses only those
pub const HIGH_LEAD_SAMPLE_MIN: usize = 5;

/// `[word, count]` pair; serializes as a two-element JSON array
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount(pub String, pub u64);

/// Pick the cloud's source texts: High leads when there are enough of them,
/// otherwise every lead-labelled text
pub fn select_source<'a>(high_leads: &'a [String], labelled_leads: &'a [String]) -> &'a [String] {
    if high_leads.len() > HIGH_LEAD_SAMPLE_MIN {
        high_leads
    } else {
        labelled_leads
    }
}

/// Top `limit` words by descending frequency; ties keep first-seen order
pub fn word_frequencies<S: AsRef<str>>(texts: &[S], limit: usize) -> Vec<WordCount> {
    let mut counts: HashMap<String, (u64, usize)> = HashMap::new();
    let mut seen = 0usize;

    for text in texts {
        for word in word_tokens(text.as_ref()) {
            if word.chars().count() <= MIN_WORD_CHARS || STOP_WORDS.contains(&word.as_str()) {
                continue;
            }
            let entry = counts.entry(word).or_insert((0, seen));
            entry.0 += 1;
            seen += 1;
        }
    }

    let mut ranked: Vec<(String, u64, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(limit);

    ranked
        .into_iter()
        .map(|(word, count, _)| WordCount(word, count))
        .collect()
}
