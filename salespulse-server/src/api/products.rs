//! Product catalogue endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use salespulse_common::db::{activity, products, NewProduct};
use serde_json::json;
use tracing::info;

use super::auth::CurrentUser;
use super::extract::{ApiJson, ApiPath};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/products (any role)
pub async fn list_products(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
) -> ApiResult<Json<serde_json::Value>> {
    let products = products::list_products(&state.db).await?;
    Ok(Json(json!({ "products": products })))
}

/// POST /api/products
pub async fn add_product(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(new): ApiJson<NewProduct>,
) -> ApiResult<impl IntoResponse> {
    let product = products::create_product(&state.db, &new).await?;
    activity::log_activity(
        &state.db,
        user.id(),
        "product_add",
        &format!("Added product: {}", product.name),
    )
    .await?;
    info!(id = product.id, name = %product.name, "Product added");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Product added",
            "product": product,
        })),
    ))
}

/// DELETE /api/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let product = products::delete_product(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {} not found", id)))?;
    activity::log_activity(
        &state.db,
        user.id(),
        "product_delete",
        &format!("Deleted product: {}", product.name),
    )
    .await?;
    info!(id, name = %product.name, "Product deleted");

    Ok(Json(json!({ "message": "Product deleted" })))
}
