//! Recycle bin API endpoints.

use api_types::recycle::{RecycleEntryView, RecycleTarget};
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::{RecycleEntry, RecycleKind, users};

fn entry_view(entry: &RecycleEntry) -> RecycleEntryView {
    RecycleEntryView {
        kind: entry.kind.as_str().to_string(),
        id: entry.id,
        label: entry.label.clone(),
        deleted_at: entry.deleted_at,
        freight_id: entry.freight_id,
    }
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<RecycleEntryView>>, ServerError> {
    let engine = state.engine.read().await;
    let entries = engine.recycle_bin(&user.username);

    Ok(Json(entries.iter().map(entry_view).collect()))
}

pub async fn restore(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<RecycleTarget>,
) -> Result<StatusCode, ServerError> {
    let kind = RecycleKind::try_from(payload.kind.as_str())?;

    let mut engine = state.engine.write().await;
    engine.restore_recycled(&user.username, kind, payload.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn purge(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<RecycleTarget>,
) -> Result<StatusCode, ServerError> {
    let kind = RecycleKind::try_from(payload.kind.as_str())?;

    let mut engine = state.engine.write().await;
    engine.purge_recycled(&user.username, kind, payload.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
