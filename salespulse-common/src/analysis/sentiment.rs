//! Feedback sentiment tagging
//!
//! Two analyzers share the [`SentimentAnalyzer`] seam:
//! - [`PolarityLexicon`] averages word polarities (with intensifiers and
//!   negation) into a score in `[-1, 1]`, then thresholds it.
//! - [`LexiconVote`] counts positive and negative lexicon hits and takes the
//!   majority; ties are `Neutral`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// Scores strictly above this are `Positive`
pub const POSITIVE_THRESHOLD: f64 = 0.2;

/// Scores strictly below this are `Negative`
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

/// Polarity multiplier applied to a negated word
const NEGATION_FACTOR: f64 = -0.5;

/// How many tokens back a negator still applies
const NEGATION_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn from_polarity(s: f64) -> Self {
        if s > POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if s < NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }
}

/// Which analyzer the service runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentMode {
    #[default]
    Polarity,
    LexiconVote,
}

impl FromStr for SentimentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "polarity" => Ok(SentimentMode::Polarity),
            "lexicon_vote" | "lexicon-vote" => Ok(SentimentMode::LexiconVote),
            other => Err(format!(
                "unknown sentiment mode '{}' (expected 'polarity' or 'lexicon_vote')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentScore {
    pub score: f64,
    pub label: SentimentLabel,
}

pub trait SentimentAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> SentimentScore;
}

/// Build the analyzer selected by configuration
pub fn analyzer_for(mode: SentimentMode) -> Arc<dyn SentimentAnalyzer> {
    match mode {
        SentimentMode::Polarity => Arc::new(PolarityLexicon),
        SentimentMode::LexiconVote => Arc::new(LexiconVote),
    }
}

// Word polarities, roughly on the scale used by common review lexicons.
const POLARITY_WORDS: &[(&str, f64)] = &[
    // positive
    ("amazing", 0.6),
    ("approved", 0.4),
    ("awesome", 1.0),
    ("best", 1.0),
    ("better", 0.5),
    ("easy", 0.43),
    ("excellent", 1.0),
    ("excited", 0.4),
    ("fantastic", 0.9),
    ("fast", 0.2),
    ("faster", 0.3),
    ("glad", 0.5),
    ("good", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("helpful", 0.6),
    ("impressed", 0.7),
    ("interested", 0.4),
    ("keen", 0.5),
    ("love", 0.5),
    ("loved", 0.7),
    ("nice", 0.6),
    ("perfect", 1.0),
    ("pleased", 0.5),
    ("promising", 0.5),
    ("recommend", 0.5),
    ("reliable", 0.5),
    ("satisfied", 0.5),
    ("saved", 0.3),
    ("smooth", 0.4),
    ("solid", 0.3),
    ("thanks", 0.2),
    ("useful", 0.3),
    ("wonderful", 1.0),
    // negative
    ("angry", -0.5),
    ("annoyed", -0.5),
    ("awful", -1.0),
    ("bad", -0.7),
    ("broken", -0.4),
    ("buggy", -0.5),
    ("clunky", -0.4),
    ("confusing", -0.5),
    ("crash", -0.5),
    ("crashed", -0.6),
    ("difficult", -0.5),
    ("disappointed", -0.75),
    ("disappointing", -0.6),
    ("expensive", -0.5),
    ("fail", -0.5),
    ("failed", -0.5),
    ("frustrated", -0.7),
    ("frustrating", -0.7),
    ("hard", -0.29),
    ("hate", -0.8),
    ("hated", -0.9),
    ("lost", -0.3),
    ("missing", -0.2),
    ("poor", -0.4),
    ("problem", -0.3),
    ("ridiculous", -0.33),
    ("slow", -0.3),
    ("terrible", -1.0),
    ("unclear", -0.3),
    ("unhappy", -0.6),
    ("unreliable", -0.5),
    ("useless", -0.5),
    ("worse", -0.4),
    ("worst", -1.0),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("absolutely", 1.4),
    ("extremely", 1.5),
    ("highly", 1.3),
    ("incredibly", 1.4),
    ("quite", 1.1),
    ("really", 1.2),
    ("so", 1.2),
    ("super", 1.3),
    ("too", 1.2),
    ("very", 1.3),
];

const NEGATORS: &[&str] = &[
    "aren't", "can't", "cannot", "couldn't", "didn't", "doesn't", "don't", "hardly", "isn't",
    "never", "no", "not", "shouldn't", "wasn't", "weren't", "won't", "wouldn't",
];

fn is_negator(token: &str) -> bool {
    NEGATORS.contains(&token) || token.ends_with("n't")
}

static POLARITY: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| POLARITY_WORDS.iter().copied().collect());

static INTENSITY: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| INTENSIFIERS.iter().copied().collect());

// Words with an optional apostrophe suffix, so "don't" stays one token.
static SENTIMENT_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z]+(?:'[a-z]+)?").expect("static regex"));

fn sentiment_tokens(text: &str) -> Vec<String> {
    let normalized = text.to_lowercase().replace('\u{2019}', "'");
    SENTIMENT_TOKEN_RE
        .find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Averaged lexicon polarity with intensifiers and negation
#[derive(Debug, Clone, Copy, Default)]
pub struct PolarityLexicon;

impl PolarityLexicon {
    pub fn polarity(&self, text: &str) -> f64 {
        let tokens = sentiment_tokens(text);
        let mut hits = Vec::new();
        let mut intensity = 1.0;
        let mut last_negator: Option<usize> = None;

        for (i, token) in tokens.iter().enumerate() {
            let token = token.as_str();
            if is_negator(token) {
                last_negator = Some(i);
                continue;
            }
            if let Some(factor) = INTENSITY.get(token) {
                intensity *= factor;
                continue;
            }
            if let Some(polarity) = POLARITY.get(token) {
                let mut value = polarity * intensity;
                if last_negator.is_some_and(|n| i - n <= NEGATION_WINDOW) {
                    value *= NEGATION_FACTOR;
                }
                hits.push(value.clamp(-1.0, 1.0));
            }
            intensity = 1.0;
        }

        if hits.is_empty() {
            return 0.0;
        }
        (hits.iter().sum::<f64>() / hits.len() as f64).clamp(-1.0, 1.0)
    }
}

impl SentimentAnalyzer for PolarityLexicon {
    fn analyze(&self, text: &str) -> SentimentScore {
        let score = self.polarity(text);
        SentimentScore {
            score,
            label: SentimentLabel::from_polarity(score),
        }
    }
}

/// Majority vote over lexicon hits
///
/// The score is `1.0`, `-1.0` or `0.0` for the winning bucket so the label
/// always agrees with the polarity thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconVote;

impl LexiconVote {
    /// (positive hits, negative hits)
    pub fn count(&self, text: &str) -> (usize, usize) {
        sentiment_tokens(text)
            .iter()
            .filter_map(|t| POLARITY.get(t.as_str()))
            .fold((0, 0), |(pos, neg), p| {
                if *p > 0.0 {
                    (pos + 1, neg)
                } else {
                    (pos, neg + 1)
                }
            })
    }
}

impl SentimentAnalyzer for LexiconVote {
    fn analyze(&self, text: &str) -> SentimentScore {
        let (pos, neg) = self.count(text);
        let score = match pos.cmp(&neg) {
            std::cmp::Ordering::Greater => 1.0,
            std::cmp::Ordering::Less => -1.0,
            std::cmp::Ordering::Equal => 0.0,
        };
        SentimentScore {
            score,
            label: SentimentLabel::from_polarity(score),
        }
    }
}
