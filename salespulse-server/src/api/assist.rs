//! Writing helpers for salespeople: grammar touch-up and the chat assistant

use axum::{extract::State, Extension, Json};
use salespulse_common::analysis::grammar;
use salespulse_common::chat::build_prompt;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::auth::CurrentUser;
use super::extract::ApiJson;
use super::leads::TextRequest;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/check-grammar
pub async fn check_grammar(
    ApiJson(req): ApiJson<TextRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    Ok(Json(json!({ "corrected_text": grammar::correct(&req.text) })))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub context: String,
}

/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let Some(model) = state.chat.as_ref() else {
        return Err(ApiError::Unavailable("Chatbot not configured".to_string()));
    };
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("No message".to_string()));
    }

    let prompt = build_prompt(user.0.role, &req.context, &req.message);
    let reply = model.generate(&prompt).await.map_err(|e| {
        warn!("Chat request failed: {}", e);
        ApiError::Internal(e.to_string())
    })?;

    Ok(Json(json!({ "reply": reply })))
}
