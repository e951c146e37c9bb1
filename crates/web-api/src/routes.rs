use axum::{
    extract::{Query, State, WebSocketUpgrade},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::{
    error::ApiError,
    state::AppState,
    ws_connection::{run_chat_session, run_notes_session},
};

#[derive(Debug, Deserialize)]
struct EventsQuery {
    token: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/chat/dispatch", get(chat_dispatch))
        .route("/notes/events", get(notes_events))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn chat_dispatch(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_chat_session(socket, state))
}

async fn notes_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<EventsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let principal = state
        .jwt_service
        .resolve_principal(&headers, query.token.as_deref())
        .map_err(|err| {
            tracing::info!(error = %err, "拒绝未认证的订阅");
            ApiError::from(state.classifier.classify(&err))
        })?;

    Ok(ws.on_upgrade(move |socket| run_notes_session(socket, state, principal)))
}
