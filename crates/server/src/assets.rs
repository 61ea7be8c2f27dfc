//! Asset API endpoints.

use api_types::asset::{AssetNew, AssetPatch, AssetView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::{Asset, AssetKind, users};

fn asset_view(asset: &Asset) -> AssetView {
    AssetView {
        id: asset.id,
        kind: asset.kind.as_str().to_string(),
        identifier: asset.identifier.clone(),
        description: asset.description.clone(),
        images: asset.images.clone(),
        is_deleted: asset.is_deleted,
        deleted_at: asset.deleted_at,
        updated_at: asset.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<AssetView>>, ServerError> {
    let engine = state.engine.read().await;
    let assets = engine.list_assets(&user.username);

    Ok(Json(assets.iter().map(asset_view).collect()))
}

pub async fn asset_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AssetNew>,
) -> Result<(StatusCode, Json<AssetView>), ServerError> {
    let cmd = engine::AssetNew {
        kind: AssetKind::try_from(payload.kind.as_str())?,
        identifier: payload.identifier,
        description: payload.description,
        images: payload.images,
    };

    let mut engine = state.engine.write().await;
    let asset_id = engine.new_asset(&user.username, cmd).await?;
    let asset = engine.asset(&user.username, asset_id)?;

    Ok((StatusCode::CREATED, Json(asset_view(&asset))))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(asset_id): Path<Uuid>,
) -> Result<Json<AssetView>, ServerError> {
    let engine = state.engine.read().await;
    let asset = engine.asset(&user.username, asset_id)?;

    Ok(Json(asset_view(&asset)))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(asset_id): Path<Uuid>,
    Json(payload): Json<AssetPatch>,
) -> Result<Json<AssetView>, ServerError> {
    let patch = engine::AssetPatch {
        kind: payload
            .kind
            .as_deref()
            .map(AssetKind::try_from)
            .transpose()?,
        identifier: payload.identifier,
        description: payload.description,
        images: payload.images,
    };

    let mut engine = state.engine.write().await;
    engine.update_asset(&user.username, asset_id, patch).await?;
    let asset = engine.asset(&user.username, asset_id)?;

    Ok(Json(asset_view(&asset)))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(asset_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.delete_asset(&user.username, asset_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn restore(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(asset_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.restore_asset(&user.username, asset_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn purge(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(asset_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.purge_asset(&user.username, asset_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
