//! Rate confirmation scan proxy.
//!
//! Forwards the raw document text to the configured extractor and relays
//! the field guesses back untouched. The extraction is best effort; the
//! client treats every returned field as a prefill suggestion only.

use api_types::scan::{ScanFields, ScanRequest};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState};
use engine::users;

pub async fn scan(
    Extension(_): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<ScanFields>, ServerError> {
    if payload.text.trim().is_empty() {
        return Err(ServerError::Generic("text is required".to_string()));
    }

    let Some(config) = &state.scan else {
        return Err(ServerError::Generic(
            "document scanning is not configured".to_string(),
        ));
    };

    let mut request = state.http.post(&config.url).json(&payload);
    if let Some(api_key) = &config.api_key {
        request = request.bearer_auth(api_key);
    }

    let response = request
        .send()
        .await
        .map_err(|err| ServerError::Upstream(err.to_string()))?;
    if !response.status().is_success() {
        return Err(ServerError::Upstream(format!(
            "extractor returned {}",
            response.status()
        )));
    }

    let fields: ScanFields = response
        .json()
        .await
        .map_err(|err| ServerError::Upstream(err.to_string()))?;

    Ok(Json(fields))
}
