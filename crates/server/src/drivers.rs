//! Driver API endpoints, including the payroll projection.

use api_types::driver::{DriverNew, DriverPatch, DriverView, PayrollRequest, PayrollResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::{Driver, PayRate, users};

fn driver_view(driver: &Driver) -> DriverView {
    DriverView {
        id: driver.id,
        name: driver.name.clone(),
        pay_type: driver.pay.kind_str().to_string(),
        pay_rate: driver.pay.rate_value(),
        images: driver.images.clone(),
        is_deleted: driver.is_deleted,
        deleted_at: driver.deleted_at,
        updated_at: driver.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<DriverView>>, ServerError> {
    let engine = state.engine.read().await;
    let drivers = engine.list_drivers(&user.username);

    Ok(Json(drivers.iter().map(driver_view).collect()))
}

pub async fn driver_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<DriverNew>,
) -> Result<(StatusCode, Json<DriverView>), ServerError> {
    let cmd = engine::DriverNew {
        name: payload.name,
        pay: PayRate::from_parts(&payload.pay_type, payload.pay_rate)?,
        images: payload.images,
    };

    let mut engine = state.engine.write().await;
    let driver_id = engine.new_driver(&user.username, cmd).await?;
    let driver = engine.driver(&user.username, driver_id)?;

    Ok((StatusCode::CREATED, Json(driver_view(&driver))))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(driver_id): Path<Uuid>,
) -> Result<Json<DriverView>, ServerError> {
    let engine = state.engine.read().await;
    let driver = engine.driver(&user.username, driver_id)?;

    Ok(Json(driver_view(&driver)))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(driver_id): Path<Uuid>,
    Json(payload): Json<DriverPatch>,
) -> Result<Json<DriverView>, ServerError> {
    let pay = match (payload.pay_type, payload.pay_rate) {
        (Some(kind), Some(rate)) => Some(PayRate::from_parts(&kind, rate)?),
        (None, None) => None,
        _ => {
            return Err(ServerError::Generic(
                "pay_type and pay_rate change together".to_string(),
            ));
        }
    };
    let patch = engine::DriverPatch {
        name: payload.name,
        pay,
        images: payload.images,
    };

    let mut engine = state.engine.write().await;
    engine.update_driver(&user.username, driver_id, patch).await?;
    let driver = engine.driver(&user.username, driver_id)?;

    Ok(Json(driver_view(&driver)))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(driver_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.delete_driver(&user.username, driver_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn restore(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(driver_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.restore_driver(&user.username, driver_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn purge(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(driver_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.purge_driver(&user.username, driver_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn payroll(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(driver_id): Path<Uuid>,
    Json(payload): Json<PayrollRequest>,
) -> Result<Json<PayrollResponse>, ServerError> {
    let engine = state.engine.read().await;
    let total = engine.payroll(&user.username, driver_id, &payload.freight_ids)?;

    Ok(Json(PayrollResponse {
        total_cents: total.cents(),
    }))
}
