use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    activity, assets, categories, drivers, expenses, freights, home, recycle, scan, statistics,
};
use engine::{Engine, users};

/// Where rate-confirmation text is sent for field extraction.
#[derive(Clone, Debug)]
pub struct ScanConfig {
    pub url: String,
    pub api_key: Option<String>,
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<RwLock<Engine>>,
    /// `None` runs the server in single-user local mode: no credentials,
    /// every request acts as the fixed "local" identity.
    pub db: Option<DatabaseConnection>,
    pub http: reqwest::Client,
    pub scan: Option<ScanConfig>,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user = match &state.db {
        Some(db) => {
            let Some(header) = auth_header else {
                return Err(StatusCode::UNAUTHORIZED);
            };
            if header.username().is_empty() || header.password().is_empty() {
                return Err(StatusCode::UNAUTHORIZED);
            }

            let user = users::Entity::find()
                .filter(users::Column::Username.eq(header.username()))
                .filter(users::Column::Password.eq(header.password()))
                .one(db)
                .await
                .map_err(|_| StatusCode::UNAUTHORIZED)?;

            match user {
                Some(user) => user,
                None => return Err(StatusCode::UNAUTHORIZED),
            }
        }
        None => users::Model {
            username: "local".to_string(),
            password: String::new(),
        },
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/freights", get(freights::list).post(freights::freight_new))
        .route(
            "/freights/{id}",
            get(freights::get)
                .patch(freights::update)
                .delete(freights::remove),
        )
        .route("/freights/{id}/restore", post(freights::restore))
        .route("/freights/{id}/purge", post(freights::purge))
        .route("/freights/{id}/comments", post(freights::comment_new))
        .route("/freights/{id}/expenses", post(freights::expense_new))
        .route(
            "/freights/{id}/expenses/{expense_id}",
            patch(freights::expense_update).delete(freights::expense_remove),
        )
        .route(
            "/freights/{id}/expenses/{expense_id}/restore",
            post(freights::expense_restore),
        )
        .route(
            "/freights/{id}/expenses/{expense_id}/purge",
            post(freights::expense_purge),
        )
        .route("/assets", get(assets::list).post(assets::asset_new))
        .route(
            "/assets/{id}",
            get(assets::get).patch(assets::update).delete(assets::remove),
        )
        .route("/assets/{id}/restore", post(assets::restore))
        .route("/assets/{id}/purge", post(assets::purge))
        .route("/drivers", get(drivers::list).post(drivers::driver_new))
        .route(
            "/drivers/{id}",
            get(drivers::get)
                .patch(drivers::update)
                .delete(drivers::remove),
        )
        .route("/drivers/{id}/restore", post(drivers::restore))
        .route("/drivers/{id}/purge", post(drivers::purge))
        .route("/drivers/{id}/payroll", post(drivers::payroll))
        .route("/expenses", get(expenses::list).post(expenses::expense_new))
        .route(
            "/expenses/{id}",
            get(expenses::get)
                .patch(expenses::update)
                .delete(expenses::remove),
        )
        .route("/expenses/{id}/restore", post(expenses::restore))
        .route("/expenses/{id}/purge", post(expenses::purge))
        .route("/expenses/{id}/comments", post(expenses::comment_new))
        .route("/home", get(home::list).post(home::home_new))
        .route("/home/{id}", patch(home::update).delete(home::remove))
        .route("/activity", get(activity::list))
        .route("/recycle", get(recycle::list))
        .route("/recycle/restore", post(recycle::restore))
        .route("/recycle/purge", post(recycle::purge))
        .route("/statistics", get(statistics::get))
        .route("/categories", get(categories::list).post(categories::category_new))
        .route("/scan", post(scan::scan))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

fn state_for(engine: Engine, db: Option<DatabaseConnection>, scan: Option<ScanConfig>) -> ServerState {
    ServerState {
        engine: Arc::new(RwLock::new(engine)),
        db,
        http: reqwest::Client::new(),
        scan,
    }
}

pub async fn run(engine: Engine, db: Option<DatabaseConnection>, scan: Option<ScanConfig>) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind 127.0.0.1:3000: {err}");
            return;
        }
    };

    if let Err(err) = run_with_listener(engine, db, scan, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: Option<DatabaseConnection>,
    scan: Option<ScanConfig>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("listening on {addr}");
    }
    axum::serve(listener, router(state_for(engine, db, scan))).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: Option<DatabaseConnection>,
    scan: Option<ScanConfig>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, scan, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
