//! Admin HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use palaver_shared::time::timestamp_to_rfc3339;
use tower_http::trace::TraceLayer;

use crate::{
    infrastructure::dto::http::{HistoryDto, MemberDto, MembersDto},
    ui::state::AppState,
};

/// Build the admin router
pub fn admin_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/members", get(get_members))
        .route("/api/history", get(get_history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// List live connections in join order
pub async fn get_members(State(state): State<Arc<AppState>>) -> Json<MembersDto> {
    let session = state.get_session_state_usecase.execute().await;

    // Domain Model to DTO
    let members: Vec<MemberDto> = session
        .members
        .into_iter()
        .map(|m| MemberDto {
            connection_id: m.id.value(),
            name: m.name.map(|n| n.as_str().to_string()),
            peer: m.peer.to_string(),
            connected_at: timestamp_to_rfc3339(m.connected_at.value()),
        })
        .collect();

    Json(MembersDto {
        count: members.len(),
        members,
    })
}

/// Full history log, oldest first
pub async fn get_history(State(state): State<Arc<AppState>>) -> Json<HistoryDto> {
    let lines: Vec<String> = state
        .get_session_state_usecase
        .history()
        .await
        .into_iter()
        .map(|line| line.into_string())
        .collect();

    Json(HistoryDto {
        count: lines.len(),
        lines,
    })
}
