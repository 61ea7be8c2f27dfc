//! Expense category API endpoints.

use api_types::category::{CategoryList, CategoryNew};
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::users;

/// Predefined names first, custom names after, in registration order.
pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<CategoryList>, ServerError> {
    let engine = state.engine.read().await;
    let categories = engine.list_categories(&user.username);

    Ok(Json(CategoryList { categories }))
}

pub async fn category_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.add_category(&user.username, &payload.name).await?;

    Ok(StatusCode::CREATED)
}
