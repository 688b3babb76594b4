//! REST endpoints for chat history.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;

use super::traits::{ChatStore, ChatUpdate, new_chat_id};
use crate::error::DatabaseError;
use crate::screening::Message;

#[derive(Clone)]
pub struct ChatRouteState {
    pub store: Arc<dyn ChatStore>,
}

/// Body for PUT /api/users/{user_id}/chats/{chat_id}.
#[derive(Debug, Deserialize)]
pub struct SaveChatRequest {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub conversation_state: Option<Value>,
}

fn storage_error(op: &str, e: DatabaseError) -> Response {
    error!(op, error = %e, "Chat storage failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Chat storage is unavailable"})),
    )
        .into_response()
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Chat not found"})),
    )
        .into_response()
}

/// POST /api/users/{user_id}/chats
///
/// Starts an empty chat and returns its id.
async fn create_chat(
    State(state): State<ChatRouteState>,
    Path(user_id): Path<String>,
) -> Response {
    let chat_id = new_chat_id();
    match state
        .store
        .save_chat(&user_id, &chat_id, ChatUpdate::default())
        .await
    {
        Ok(chat) => (StatusCode::CREATED, Json(chat)).into_response(),
        Err(e) => storage_error("create_chat", e),
    }
}

/// GET /api/users/{user_id}/chats
async fn list_chats(
    State(state): State<ChatRouteState>,
    Path(user_id): Path<String>,
) -> Response {
    match state.store.list_chats(&user_id).await {
        Ok(chats) => Json(chats).into_response(),
        Err(e) => storage_error("list_chats", e),
    }
}

/// GET /api/users/{user_id}/chats/{chat_id}
async fn get_chat(
    State(state): State<ChatRouteState>,
    Path((user_id, chat_id)): Path<(String, String)>,
) -> Response {
    match state.store.load_chat(&user_id, &chat_id).await {
        Ok(Some(chat)) => Json(chat).into_response(),
        Ok(None) => not_found(),
        Err(e) => storage_error("load_chat", e),
    }
}

/// PUT /api/users/{user_id}/chats/{chat_id}
async fn save_chat(
    State(state): State<ChatRouteState>,
    Path((user_id, chat_id)): Path<(String, String)>,
    Json(body): Json<SaveChatRequest>,
) -> Response {
    let update = ChatUpdate {
        messages: body.messages,
        title: body.title,
        conversation_state: body.conversation_state,
    };
    match state.store.save_chat(&user_id, &chat_id, update).await {
        Ok(chat) => Json(chat).into_response(),
        Err(e) => storage_error("save_chat", e),
    }
}

/// DELETE /api/users/{user_id}/chats/{chat_id}
async fn delete_chat(
    State(state): State<ChatRouteState>,
    Path((user_id, chat_id)): Path<(String, String)>,
) -> Response {
    match state.store.delete_chat(&user_id, &chat_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found(),
        Err(e) => storage_error("delete_chat", e),
    }
}

/// Build the chat history routes.
pub fn chat_routes(state: ChatRouteState) -> Router {
    Router::new()
        .route(
            "/api/users/{user_id}/chats",
            get(list_chats).post(create_chat),
        )
        .route(
            "/api/users/{user_id}/chats/{chat_id}",
            get(get_chat).put(save_chat).delete(delete_chat),
        )
        .with_state(state)
}
