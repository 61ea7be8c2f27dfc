//! Statistics API endpoint.

use api_types::stats::{StatisticsQuery, StatisticsView};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState};
use engine::users;

/// Window totals over `[from, to]`, both inclusive.
pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<StatisticsView>, ServerError> {
    if query.from > query.to {
        return Err(ServerError::Generic(
            "from must not be after to".to_string(),
        ));
    }

    let engine = state.engine.read().await;
    let totals = engine.statistics(&user.username, query.from, query.to);

    Ok(Json(StatisticsView {
        revenue_cents: totals.revenue.cents(),
        owner_revenue_cents: totals.owner_revenue.cents(),
        expenses_cents: totals.expenses.cents(),
        profit_cents: totals.profit.cents(),
        pending_count: totals.pending_count,
        cancelled_count: totals.cancelled_count,
    }))
}
