//! Top-level HTTP router.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::documents::{DocumentParser, DocumentRouteState, document_routes};
use crate::screening::{ScreeningOrchestrator, ScreeningRouteState, screening_routes};
use crate::store::{ChatRouteState, ChatStore, chat_routes};

/// Everything the handlers need, built once in `main`.
#[derive(Clone)]
pub struct AppServices {
    pub orchestrator: Arc<ScreeningOrchestrator>,
    pub parser: Arc<DocumentParser>,
    pub store: Arc<dyn ChatStore>,
}

/// Compose every route group behind a permissive CORS layer.
pub fn router(services: AppServices) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(screening_routes(ScreeningRouteState {
            orchestrator: services.orchestrator,
        }))
        .merge(document_routes(DocumentRouteState {
            parser: services.parser,
        }))
        .merge(chat_routes(ChatRouteState {
            store: services.store,
        }))
        .layer(CorsLayer::permissive())
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "status": "online",
        "endpoints": [
            "/chat/hiring",
            "/parse/resume",
            "/parse/jd",
            "/api/users/{user_id}/chats"
        ]
    }))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "talent-scout"
    }))
}
