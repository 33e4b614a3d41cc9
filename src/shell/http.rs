use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::shared::inbound::http::resource_router;
use crate::shell::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct LockQuery {
    pub key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LockDiagnostics {
    pub active_keys: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

pub fn router(state: AppState) -> Router {
    let resources = Router::new()
        .nest("/users", resource_router(state.users.clone()))
        .nest("/assistants", resource_router(state.assistants.clone()))
        .nest("/tasks", resource_router(state.tasks.clone()))
        .nest("/events", resource_router(state.events.clone()));

    Router::new()
        .route("/health", get(health))
        .route("/diagnostics/locks", get(locks))
        .with_state(state)
        .merge(resources)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn locks(State(state): State<AppState>, Query(query): Query<LockQuery>) -> Json<LockDiagnostics> {
    let locked = query.key.as_ref().map(|key| state.serializer.is_locked(key));
    Json(LockDiagnostics {
        active_keys: state.serializer.active_keys(),
        key: query.key,
        locked,
    })
}
