//! Home transaction API endpoints.
//!
//! Home records have no recycle bin; DELETE is final.

use api_types::home::{HomeNew, HomePatch, HomeView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::{HomeKind, HomeTransaction, MoneyCents, users};

fn home_view(tx: &HomeTransaction) -> HomeView {
    HomeView {
        id: tx.id,
        kind: tx.kind.as_str().to_string(),
        amount_cents: tx.amount.cents(),
        category: tx.category.clone(),
        description: tx.description.clone(),
        date: tx.date,
        updated_at: tx.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<HomeView>>, ServerError> {
    let engine = state.engine.read().await;
    let transactions = engine.list_home_transactions(&user.username);

    Ok(Json(transactions.iter().map(home_view).collect()))
}

pub async fn home_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<HomeNew>,
) -> Result<(StatusCode, Json<HomeView>), ServerError> {
    let cmd = engine::HomeNew {
        kind: HomeKind::try_from(payload.kind.as_str())?,
        amount: MoneyCents::new(payload.amount_cents),
        category: payload.category,
        description: payload.description,
        date: payload.date,
    };

    let mut engine = state.engine.write().await;
    let tx_id = engine.new_home_transaction(&user.username, cmd).await?;
    let view = engine
        .list_home_transactions(&user.username)
        .iter()
        .find(|tx| tx.id == tx_id)
        .map(home_view)
        .ok_or_else(|| ServerError::Generic("home transaction vanished".to_string()))?;

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(tx_id): Path<Uuid>,
    Json(payload): Json<HomePatch>,
) -> Result<StatusCode, ServerError> {
    let patch = engine::HomePatch {
        kind: payload
            .kind
            .as_deref()
            .map(HomeKind::try_from)
            .transpose()?,
        amount: payload.amount_cents.map(MoneyCents::new),
        category: payload.category,
        description: payload.description,
        date: payload.date,
    };

    let mut engine = state.engine.write().await;
    engine.update_home_transaction(&user.username, tx_id, patch).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(tx_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.purge_home_transaction(&user.username, tx_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
