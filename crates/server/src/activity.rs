//! Activity feed API endpoint.

use api_types::activity::{ActivityEventView, ActivityQuery};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState};
use engine::{ActivityEvent, ActivityFilter, ActivityKind, ActivityLink, users};

fn parse_kinds(kinds: &str) -> Result<Vec<ActivityKind>, ServerError> {
    kinds
        .split(',')
        .map(|token| match token.trim() {
            "revenue" => Ok(ActivityKind::Revenue),
            "expense" => Ok(ActivityKind::Expense),
            "update" => Ok(ActivityKind::Update),
            other => Err(ServerError::Generic(format!(
                "invalid activity kind: {other}"
            ))),
        })
        .collect()
}

fn kind_str(kind: ActivityKind) -> &'static str {
    match kind {
        ActivityKind::Revenue => "revenue",
        ActivityKind::Expense => "expense",
        ActivityKind::Update => "update",
    }
}

fn event_view(event: &ActivityEvent) -> ActivityEventView {
    let (link_kind, link_id) = match event.link {
        Some(ActivityLink::Freight { id }) => (Some("freight".to_string()), Some(id)),
        Some(ActivityLink::Expense { id }) => (Some("expense".to_string()), Some(id)),
        None => (None, None),
    };

    ActivityEventView {
        id: event.id.clone(),
        kind: kind_str(event.kind).to_string(),
        date: event.date,
        title: event.title.clone(),
        amount_cents: event.amount.cents(),
        status: event.status.clone(),
        presentation: event.presentation().to_string(),
        link_kind,
        link_id,
    }
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityEventView>>, ServerError> {
    let filter = ActivityFilter {
        search: query.search,
        kinds: query.kinds.as_deref().map(parse_kinds).transpose()?,
        from: query.from,
        to: query.to,
    };

    let engine = state.engine.read().await;
    let events = engine.activity(&user.username, &filter);

    Ok(Json(events.iter().map(event_view).collect()))
}
