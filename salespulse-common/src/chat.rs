//! Generative chat assistant
//!
//! [`GeminiClient`] talks to the Google Generative Language REST API. The
//! working model is picked on first use by probing the configured candidates
//! in order; the winner is cached for the life of the process. A failed probe
//! leaves the cell empty so the next request tries again.

use crate::db::models::Role;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const PROBE_PROMPT: &str = "test";
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Text-in, text-out generative model
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Prompt sent for a user question, with optional on-screen task context
pub fn build_prompt(role: Role, context: &str, message: &str) -> String {
    format!(
        "You are a helpful sales assistant for a {}.\n\
         CURRENT TASK CONTEXT: \"{}\"\n\
         USER QUESTION: {}\n\
         Be concise and action-oriented.",
        role, context, message
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Concatenated text of the first candidate
fn reply_text(response: GenerateResponse) -> Result<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(Error::Upstream("Empty response from chat model".to_string()));
    }
    Ok(text)
}

/// Gemini REST client with lazy model selection
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    candidates: Vec<String>,
    selected: OnceCell<String>,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, candidates: Vec<String>) -> Result<Self> {
        Self::with_base_url(GEMINI_BASE_URL, api_key, candidates)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        candidates: Vec<String>,
    ) -> Result<Self> {
        if candidates.is_empty() {
            return Err(Error::Config("No chat model candidates configured".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            candidates,
            selected: OnceCell::new(),
        })
    }

    /// Model chosen by the first successful probe, if any yet
    pub fn selected_model(&self) -> Option<&str> {
        self.selected.get().map(String::as_str)
    }

    async fn model(&self) -> Result<&str> {
        let model = self.selected.get_or_try_init(|| self.probe()).await?;
        Ok(model.as_str())
    }

    async fn probe(&self) -> Result<String> {
        for candidate in &self.candidates {
            match self.generate_with(candidate, PROBE_PROMPT, PROBE_TIMEOUT).await {
                Ok(_) => {
                    info!(model = %candidate, "Chat model selected");
                    return Ok(candidate.clone());
                }
                Err(e) => warn!(model = %candidate, "Chat model probe failed: {}", e),
            }
        }
        Err(Error::Upstream("No chat model candidate responded".to_string()))
    }

    async fn generate_with(&self, model: &str, prompt: &str, timeout: Duration) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(timeout)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "Chat API returned error {}: {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = response.json().await?;
        reply_text(parsed)
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let model = self.model().await?;
        debug!(model = %model, prompt_chars = prompt.len(), "Chat request");
        self.generate_with(model, prompt, REQUEST_TIMEOUT).await
    }
}
