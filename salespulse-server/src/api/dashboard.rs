//! Manager dashboard and CSV report

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use salespulse_common::db::dashboard::{build_dashboard, DashboardSummary};
use salespulse_common::db::feedback::all_feedback;
use salespulse_common::report::{feedback_csv, report_filename};

use crate::error::ApiResult;
use crate::AppState;

/// GET /api/dashboard
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardSummary>> {
    let summary = build_dashboard(&state.db, Utc::now().naive_utc()).await?;
    Ok(Json(summary))
}

/// GET /api/download-report
pub async fn download_report(State(state): State<AppState>) -> ApiResult<Response> {
    let rows = all_feedback(&state.db).await?;
    let body = feedback_csv(&rows)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        report_filename(Utc::now().date_naive())
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
