//! Lead scoring
//!
//! A [`LeadClassifier`] turns free text into a win probability; the
//! probability is bucketed into a [`LeadLabel`] with fixed cut points.
//! The shipped classifier is [`LinearTextModel`], a linear text pipeline
//! loaded from a JSON artifact on disk.

use super::word_tokens;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Probabilities at or above this are `High`
pub const HIGH_THRESHOLD: f64 = 0.70;

/// Probabilities at or above this (and below `HIGH_THRESHOLD`) are `Medium`
pub const MEDIUM_THRESHOLD: f64 = 0.45;

/// Artifact format tag accepted by [`LinearTextModel::from_json`]
pub const LINEAR_TEXT_FORMAT: &str = "linear-text-v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum LeadLabel {
    High,
    Medium,
    Low,
    /// The classifier failed for this text
    Error,
}

impl LeadLabel {
    pub fn from_probability(p: f64) -> Self {
        if p >= HIGH_THRESHOLD {
            LeadLabel::High
        } else if p >= MEDIUM_THRESHOLD {
            LeadLabel::Medium
        } else {
            LeadLabel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadLabel::High => "High",
            LeadLabel::Medium => "Medium",
            LeadLabel::Low => "Low",
            LeadLabel::Error => "Error",
        }
    }
}

/// Opaque pre-trained lead classifier
pub trait LeadClassifier: Send + Sync {
    /// Probability in `[0, 1]` that the lead converts
    fn predict_probability(&self, text: &str) -> Result<f64>;
}

/// Score/label pair stored on a lead row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeadScore {
    pub score: Option<f64>,
    pub label: Option<LeadLabel>,
}

impl LeadScore {
    pub fn unscored() -> Self {
        Self { score: None, label: None }
    }

    pub fn failed() -> Self {
        Self {
            score: None,
            label: Some(LeadLabel::Error),
        }
    }
}

/// Run the classifier, never failing
///
/// No model leaves the lead unscored; a prediction error (or a probability
/// outside `[0, 1]`) yields a null score with the `Error` label.
pub fn score_lead(model: Option<&dyn LeadClassifier>, text: &str) -> LeadScore {
    let Some(model) = model else {
        return LeadScore::unscored();
    };

    match predict_checked(model, text) {
        Ok(p) => LeadScore {
            score: Some(p),
            label: Some(LeadLabel::from_probability(p)),
        },
        Err(e) => {
            warn!("Lead prediction failed: {}", e);
            LeadScore::failed()
        }
    }
}

/// Run the classifier and reject values that are not probabilities
pub fn predict_checked(model: &dyn LeadClassifier, text: &str) -> Result<f64> {
    let p = model.predict_probability(text)?;
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(Error::Model(format!("classifier returned {} (not a probability)", p)));
    }
    Ok(p)
}

#[derive(Debug, Deserialize)]
struct LinearTextArtifact {
    format: String,
    intercept: f64,
    coefficients: HashMap<String, f64>,
    #[serde(default)]
    idf: Option<HashMap<String, f64>>,
    #[serde(default = "default_ngram_max")]
    ngram_max: usize,
    #[serde(default = "default_l2_normalize")]
    l2_normalize: bool,
}

fn default_ngram_max() -> usize {
    1
}

fn default_l2_normalize() -> bool {
    true
}

/// Linear text classifier: (tf or tf-idf) term weights, optional L2
/// normalisation, linear decision function, logistic sigmoid.
///
/// Only terms present in `coefficients` are features. N-grams are the
/// lowercase word tokens joined by a single space.
#[derive(Debug, Clone)]
pub struct LinearTextModel {
    intercept: f64,
    coefficients: HashMap<String, f64>,
    idf: Option<HashMap<String, f64>>,
    ngram_max: usize,
    l2_normalize: bool,
}

impl LinearTextModel {
    /// Load the artifact written by the training pipeline
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Model(format!("cannot read model {}: {}", path.display(), e))
        })?;
        let model = Self::from_json(&raw)?;
        info!(
            "Lead model loaded from {} ({} terms, ngram_max={})",
            path.display(),
            model.coefficients.len(),
            model.ngram_max
        );
        Ok(model)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let artifact: LinearTextArtifact = serde_json::from_str(raw)
            .map_err(|e| Error::Model(format!("malformed model artifact: {}", e)))?;

        if artifact.format != LINEAR_TEXT_FORMAT {
            return Err(Error::Model(format!(
                "unsupported model format '{}', expected '{}'",
                artifact.format, LINEAR_TEXT_FORMAT
            )));
        }
        if artifact.ngram_max == 0 {
            return Err(Error::Model("ngram_max must be at least 1".into()));
        }
        let all_finite = artifact.intercept.is_finite()
            && artifact.coefficients.values().all(|c| c.is_finite())
            && artifact
                .idf
                .as_ref()
                .map_or(true, |idf| idf.values().all(|w| w.is_finite()));
        if !all_finite {
            return Err(Error::Model("model contains non-finite weights".into()));
        }

        Ok(Self {
            intercept: artifact.intercept,
            coefficients: artifact.coefficients,
            idf: artifact.idf,
            ngram_max: artifact.ngram_max,
            l2_normalize: artifact.l2_normalize,
        })
    }

    /// Weighted in-vocabulary terms of `text`
    fn features(&self, text: &str) -> HashMap<String, f64> {
        let tokens = word_tokens(text);
        let mut counts: HashMap<String, f64> = HashMap::new();

        for n in 1..=self.ngram_max {
            for window in tokens.windows(n) {
                let term = window.join(" ");
                if self.coefficients.contains_key(&term) {
                    *counts.entry(term).or_insert(0.0) += 1.0;
                }
            }
        }

        if let Some(idf) = &self.idf {
            for (term, weight) in counts.iter_mut() {
                *weight *= idf.get(term).copied().unwrap_or(1.0);
            }
        }

        if self.l2_normalize {
            let norm = counts.values().map(|w| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for weight in counts.values_mut() {
                    *weight /= norm;
                }
            }
        }

        counts
    }

    /// Signed distance from the decision boundary
    pub fn decision_function(&self, text: &str) -> f64 {
        let features = self.features(text);
        let dot: f64 = features
            .iter()
            .map(|(term, weight)| weight * self.coefficients[term])
            .sum();
        debug!(terms = features.len(), "Lead decision function evaluated");
        self.intercept + dot
    }
}

impl LeadClassifier for LinearTextModel {
    fn predict_probability(&self, text: &str) -> Result<f64> {
        let z = self.decision_function(text);
        if !z.is_finite() {
            return Err(Error::Model("decision function is not finite".into()));
        }
        Ok(sigmoid(z))
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
