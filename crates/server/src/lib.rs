use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ScanConfig, run, run_with_listener, spawn_with_listener};

mod activity;
mod assets;
mod categories;
mod drivers;
mod expenses;
mod freights;
mod home;
mod recycle;
mod scan;
mod server;
mod statistics;

pub mod types {
    pub mod freight {
        pub use api_types::freight::{
            CommentNew, CommentView, FreightList, FreightListQuery, FreightNew, FreightPatch,
            FreightView, LoadExpenseNew, LoadExpensePatch, LoadExpenseView,
        };
    }

    pub mod asset {
        pub use api_types::asset::{AssetNew, AssetPatch, AssetView};
    }

    pub mod driver {
        pub use api_types::driver::{
            DriverNew, DriverPatch, DriverView, PayrollRequest, PayrollResponse,
        };
    }

    pub mod expense {
        pub use api_types::expense::{ExpenseNew, ExpensePatch, ExpenseView};
    }

    pub mod home {
        pub use api_types::home::{HomeNew, HomePatch, HomeView};
    }

    pub mod activity {
        pub use api_types::activity::{ActivityEventView, ActivityQuery};
    }

    pub mod recycle {
        pub use api_types::recycle::{RecycleEntryView, RecycleTarget};
    }

    pub mod stats {
        pub use api_types::stats::{StatisticsQuery, StatisticsView};
    }

    pub mod category {
        pub use api_types::category::{CategoryList, CategoryNew};
    }

    pub mod scan {
        pub use api_types::scan::{ScanFields, ScanRequest};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
    /// The document extractor misbehaved: unreachable, non-JSON, or an
    /// error status. Never mapped to a client error.
    Upstream(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) | EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidField(_)
        | EngineError::InvalidId(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Storage(storage_err) => {
            tracing::error!("storage error: {storage_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Upstream(err) => {
                tracing::error!("scan upstream error: {err}");
                (
                    StatusCode::BAD_GATEWAY,
                    "document extractor unavailable".to_string(),
                )
            }
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res =
            ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidAmount("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res = ServerError::from(EngineError::InvalidField("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_storage_maps_to_500_with_swallowed_message() {
        let res = ServerError::from(EngineError::Storage("disk full".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_maps_to_502() {
        let res = ServerError::Upstream("connection refused".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }
}
