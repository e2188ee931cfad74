//! Lead and feedback submission, standalone lead prediction

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use salespulse_common::analysis::lead::score_lead;
use salespulse_common::db::feedback::submit_feedback;
use salespulse_common::db::NewFeedback;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::auth::CurrentUser;
use super::extract::ApiJson;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: String,
}

/// POST /api/submit-lead
pub async fn submit_lead(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(req): ApiJson<TextRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Lead text is required".to_string()));
    }

    let result = score_lead(state.lead_model.as_deref(), &req.text);
    let new = NewFeedback {
        salesperson_id: user.id(),
        text: req.text,
        status: "lead".to_string(),
        lead_score: result.score,
        lead_label: result.label,
        ..Default::default()
    };

    let score_text = result
        .score
        .map(|s| format!("{:.2}", s))
        .unwrap_or_else(|| "None".to_string());
    let id = submit_feedback(&state.db, &new, "lead_submit", |id| {
        format!("Lead {} submitted (Score: {})", id, score_text)
    })
    .await?;
    debug!(id, label = ?result.label, "Lead stored");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Lead submitted",
            "ml_result": result,
        })),
    ))
}

/// POST /api/analyze-feedback (also /api/feedback)
pub async fn analyze_feedback(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(req): ApiJson<TextRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Feedback text is required".to_string()));
    }

    let result = state.sentiment.analyze(&req.text);
    let new = NewFeedback {
        salesperson_id: user.id(),
        text: req.text,
        status: "feedback".to_string(),
        sentiment_score: Some(result.score),
        sentiment_label: Some(result.label),
        ..Default::default()
    };

    let label = result.label;
    let id = submit_feedback(&state.db, &new, "feedback_submit", |id| {
        format!("Feedback {} submitted (Sentiment: {})", id, label.as_str())
    })
    .await?;
    debug!(id, label = label.as_str(), "Feedback stored");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Feedback submitted",
            "sentiment_result": result,
        })),
    ))
}

/// POST /api/predict-lead
///
/// Scores text without storing it. A classifier failure answers with a null
/// score and the `Error` label, same as on submission.
pub async fn predict_lead(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    ApiJson(req): ApiJson<TextRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("No text provided".to_string()));
    }
    let Some(model) = state.lead_model.as_deref() else {
        return Err(ApiError::Unavailable("ML model not loaded".to_string()));
    };

    let result = score_lead(Some(model), &req.text);
    Ok(Json(json!(result)))
}
