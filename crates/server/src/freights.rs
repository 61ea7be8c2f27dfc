//! Freight API endpoints.

use api_types::freight::{
    CommentNew, CommentView, FreightList, FreightListQuery, FreightNew, FreightPatch, FreightView,
    LoadExpenseNew, LoadExpensePatch, LoadExpenseView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::{CommentKind, ExpenseCategory, Freight, FreightStatus, MoneyCents, users};

fn comment_kind_str(kind: CommentKind) -> &'static str {
    match kind {
        CommentKind::Manual => "manual",
        CommentKind::System => "system",
    }
}

fn parse_status(status: Option<&str>) -> Result<Option<FreightStatus>, ServerError> {
    status
        .map(FreightStatus::try_from)
        .transpose()
        .map_err(ServerError::from)
}

pub(crate) fn freight_view(freight: &Freight) -> FreightView {
    FreightView {
        id: freight.id,
        label: freight.label.clone(),
        origin: freight.origin.clone(),
        destination: freight.destination.clone(),
        distance_miles: freight.distance_miles,
        weight_lbs: freight.weight_lbs,
        date: freight.date,
        driver_id: freight.driver_id,
        driver_name: freight.driver_name.clone(),
        asset_id: freight.asset_id,
        asset_name: freight.asset_name.clone(),
        line_haul_cents: freight.line_haul.cents(),
        fuel_surcharge_cents: freight.fuel_surcharge.cents(),
        loading_cents: freight.loading.cents(),
        unloading_cents: freight.unloading.cents(),
        accessorials_cents: freight.accessorials.cents(),
        owner_percentage: freight.owner_percentage,
        revenue_cents: freight.revenue.cents(),
        owner_amount_cents: freight.owner_amount.cents(),
        total_expenses_cents: freight.total_expenses.cents(),
        net_profit_cents: freight.net_profit.cents(),
        status: freight.status.as_str().to_string(),
        expenses: freight.expenses.iter().map(load_expense_view).collect(),
        comments: freight.comments.iter().map(comment_view).collect(),
        is_deleted: freight.is_deleted,
        deleted_at: freight.deleted_at,
        updated_at: freight.updated_at,
    }
}

fn load_expense_view(expense: &engine::LoadExpense) -> LoadExpenseView {
    LoadExpenseView {
        id: expense.id,
        category: expense.category.name().to_string(),
        description: expense.description.clone(),
        amount_cents: expense.amount.cents(),
        date: expense.date,
        is_deleted: expense.is_deleted,
        deleted_at: expense.deleted_at,
    }
}

fn comment_view(comment: &engine::LoadComment) -> CommentView {
    CommentView {
        id: comment.id,
        text: comment.text.clone(),
        author: comment.author.clone(),
        created_at: comment.created_at,
        event_date: comment.event_date,
        kind: comment_kind_str(comment.kind).to_string(),
    }
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<FreightListQuery>,
) -> Result<Json<FreightList>, ServerError> {
    let engine = state.engine.read().await;
    let page = engine.list_freights(
        &user.username,
        query.limit.unwrap_or(50),
        query.cursor.as_deref(),
    )?;

    Ok(Json(FreightList {
        freights: page.freights.iter().map(freight_view).collect(),
        next_cursor: page.next_cursor,
    }))
}

pub async fn freight_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<FreightNew>,
) -> Result<(StatusCode, Json<FreightView>), ServerError> {
    let status = parse_status(payload.status.as_deref())?.unwrap_or_default();
    let cmd = engine::FreightNew {
        label: payload.label,
        origin: payload.origin,
        destination: payload.destination,
        distance_miles: payload.distance_miles,
        weight_lbs: payload.weight_lbs,
        date: payload.date,
        driver_id: payload.driver_id,
        asset_id: payload.asset_id,
        line_haul: MoneyCents::new(payload.line_haul_cents),
        fuel_surcharge: MoneyCents::new(payload.fuel_surcharge_cents),
        loading: MoneyCents::new(payload.loading_cents),
        unloading: MoneyCents::new(payload.unloading_cents),
        accessorials: MoneyCents::new(payload.accessorials_cents),
        owner_percentage: payload.owner_percentage,
        status,
        comment: payload.comment,
        author: user.username.clone(),
    };

    let mut engine = state.engine.write().await;
    let freight_id = engine.new_freight(&user.username, cmd).await?;
    let freight = engine.freight(&user.username, freight_id)?;

    Ok((StatusCode::CREATED, Json(freight_view(&freight))))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(freight_id): Path<Uuid>,
) -> Result<Json<FreightView>, ServerError> {
    let engine = state.engine.read().await;
    let freight = engine.freight(&user.username, freight_id)?;

    Ok(Json(freight_view(&freight)))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(freight_id): Path<Uuid>,
    Json(payload): Json<FreightPatch>,
) -> Result<Json<FreightView>, ServerError> {
    let status = parse_status(payload.status.as_deref())?;
    let patch = engine::FreightPatch {
        label: payload.label,
        origin: payload.origin,
        destination: payload.destination,
        distance_miles: payload.distance_miles,
        weight_lbs: payload.weight_lbs,
        date: payload.date,
        driver_id: payload.driver_id,
        asset_id: payload.asset_id,
        line_haul: payload.line_haul_cents.map(MoneyCents::new),
        fuel_surcharge: payload.fuel_surcharge_cents.map(MoneyCents::new),
        loading: payload.loading_cents.map(MoneyCents::new),
        unloading: payload.unloading_cents.map(MoneyCents::new),
        accessorials: payload.accessorials_cents.map(MoneyCents::new),
        owner_percentage: payload.owner_percentage,
        status,
        edit_note: payload.edit_note,
        author: user.username.clone(),
    };

    let mut engine = state.engine.write().await;
    engine.update_freight(&user.username, freight_id, patch).await?;
    let freight = engine.freight(&user.username, freight_id)?;

    Ok(Json(freight_view(&freight)))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(freight_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.delete_freight(&user.username, freight_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn restore(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(freight_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.restore_freight(&user.username, freight_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn purge(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(freight_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.purge_freight(&user.username, freight_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn comment_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(freight_id): Path<Uuid>,
    Json(payload): Json<CommentNew>,
) -> Result<(StatusCode, Json<FreightView>), ServerError> {
    let cmd = engine::CommentNew {
        text: payload.text,
        author: user.username.clone(),
        event_date: payload.event_date,
    };

    let mut engine = state.engine.write().await;
    engine.add_freight_comment(&user.username, freight_id, cmd).await?;
    let freight = engine.freight(&user.username, freight_id)?;

    Ok((StatusCode::CREATED, Json(freight_view(&freight))))
}

pub async fn expense_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(freight_id): Path<Uuid>,
    Json(payload): Json<LoadExpenseNew>,
) -> Result<(StatusCode, Json<FreightView>), ServerError> {
    let cmd = engine::LoadExpenseNew {
        category: ExpenseCategory::from(payload.category.as_str()),
        description: payload.description,
        amount: MoneyCents::new(payload.amount_cents),
        date: payload.date,
    };

    let mut engine = state.engine.write().await;
    engine.add_load_expense(&user.username, freight_id, cmd).await?;
    let freight = engine.freight(&user.username, freight_id)?;

    Ok((StatusCode::CREATED, Json(freight_view(&freight))))
}

pub async fn expense_update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((freight_id, expense_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<LoadExpensePatch>,
) -> Result<Json<FreightView>, ServerError> {
    let patch = engine::LoadExpensePatch {
        category: payload
            .category
            .map(|name| ExpenseCategory::from(name.as_str())),
        description: payload.description,
        amount: payload.amount_cents.map(MoneyCents::new),
        date: payload.date,
    };

    let mut engine = state.engine.write().await;
    engine
        .update_load_expense(&user.username, freight_id, expense_id, patch)
        .await?;
    let freight = engine.freight(&user.username, freight_id)?;

    Ok(Json(freight_view(&freight)))
}

pub async fn expense_remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((freight_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine
        .delete_load_expense(&user.username, freight_id, expense_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn expense_restore(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((freight_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine
        .restore_load_expense(&user.username, freight_id, expense_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn expense_purge(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((freight_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine
        .purge_load_expense(&user.username, freight_id, expense_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
