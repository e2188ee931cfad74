//! Text analysis: lead scoring, sentiment tagging, grammar touch-up and
//! the pure aggregation steps behind the manager dashboard.

pub mod grammar;
pub mod lead;
pub mod sentiment;
pub mod trends;
pub mod wordcloud;

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("static regex"));

/// Lowercased `\w+` tokens of `text`, in order
pub fn word_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}
