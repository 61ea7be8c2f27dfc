//! Standalone expense API endpoints.

use api_types::expense::{ExpenseNew, ExpensePatch, ExpenseView};
use api_types::freight::CommentNew;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::{ExpenseCategory, ExpenseLink, MoneyCents, StandaloneExpense, users};

fn expense_view(expense: &StandaloneExpense) -> ExpenseView {
    let (link_kind, link_id, link_name) = match &expense.link {
        ExpenseLink::None => ("none", None, None),
        ExpenseLink::Driver { id, name } => ("driver", Some(*id), Some(name.clone())),
        ExpenseLink::Asset { id, name } => ("asset", Some(*id), Some(name.clone())),
    };

    ExpenseView {
        id: expense.id,
        category: expense.category.name().to_string(),
        description: expense.description.clone(),
        amount_cents: expense.amount.cents(),
        date: expense.date,
        link_kind: link_kind.to_string(),
        link_id,
        link_name,
        is_deleted: expense.is_deleted,
        deleted_at: expense.deleted_at,
        updated_at: expense.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let engine = state.engine.read().await;
    let expenses = engine.list_expenses(&user.username);

    Ok(Json(expenses.iter().map(expense_view).collect()))
}

pub async fn expense_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let cmd = engine::ExpenseNew {
        category: ExpenseCategory::from(payload.category.as_str()),
        description: payload.description,
        amount: MoneyCents::new(payload.amount_cents),
        date: payload.date,
        driver_id: payload.driver_id,
        asset_id: payload.asset_id,
    };

    let mut engine = state.engine.write().await;
    let expense_id = engine.new_expense(&user.username, cmd).await?;
    let expense = engine.expense(&user.username, expense_id)?;

    Ok((StatusCode::CREATED, Json(expense_view(&expense))))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let engine = state.engine.read().await;
    let expense = engine.expense(&user.username, expense_id)?;

    Ok(Json(expense_view(&expense)))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ExpensePatch>,
) -> Result<Json<ExpenseView>, ServerError> {
    let patch = engine::ExpensePatch {
        category: payload
            .category
            .map(|name| ExpenseCategory::from(name.as_str())),
        description: payload.description,
        amount: payload.amount_cents.map(MoneyCents::new),
        date: payload.date,
    };

    let mut engine = state.engine.write().await;
    engine.update_expense(&user.username, expense_id, patch).await?;
    let expense = engine.expense(&user.username, expense_id)?;

    Ok(Json(expense_view(&expense)))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.delete_expense(&user.username, expense_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn restore(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.restore_expense(&user.username, expense_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn purge(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.purge_expense(&user.username, expense_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn comment_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<CommentNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let cmd = engine::CommentNew {
        text: payload.text,
        author: user.username.clone(),
        event_date: payload.event_date,
    };

    let mut engine = state.engine.write().await;
    engine.add_expense_comment(&user.username, expense_id, cmd).await?;
    let expense = engine.expense(&user.username, expense_id)?;

    Ok((StatusCode::CREATED, Json(expense_view(&expense))))
}
