//! REST endpoint for screening turns.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::error;

use super::model::{CandidateRecord, TechQuestionSet};
use super::orchestrator::ScreeningOrchestrator;
use super::state::{ConversationState, Stage};

/// Shared state for screening routes.
#[derive(Clone)]
pub struct ScreeningRouteState {
    pub orchestrator: Arc<ScreeningOrchestrator>,
}

/// Inbound turn: the message plus whatever snapshot the caller holds.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_state: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_state: ConversationState,
    pub candidate_info: CandidateRecord,
    pub tech_questions: TechQuestionSet,
    pub stage: Stage,
    pub conversation_ended: bool,
}

impl From<(String, ConversationState)> for ChatResponse {
    fn from((response, state): (String, ConversationState)) -> Self {
        Self {
            response,
            candidate_info: state.candidate().clone(),
            tech_questions: state.tech_questions().clone(),
            stage: state.stage(),
            conversation_ended: state.is_concluded(),
            conversation_state: state,
        }
    }
}

/// POST /chat/hiring
///
/// Runs one screening turn. A missing or malformed snapshot starts a new
/// conversation. Returns 502 when the model cannot produce a reply; the
/// caller should keep its previous snapshot.
async fn chat_hiring(
    State(state): State<ScreeningRouteState>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    if request.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Message must not be empty"})),
        )
            .into_response();
    }

    let conversation = ConversationState::from_snapshot(request.conversation_state);

    match state
        .orchestrator
        .process_turn(&conversation, &request.message)
        .await
    {
        Ok(outcome) => Json(ChatResponse::from((outcome.response, outcome.state))).into_response(),
        Err(e) => {
            error!(error = %e, stage = %conversation.stage(), "Screening turn failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": "The assistant is temporarily unavailable. Please try again."})),
            )
                .into_response()
        }
    }
}

/// Build the screening routes.
pub fn screening_routes(state: ScreeningRouteState) -> Router {
    Router::new()
        .route("/chat/hiring", post(chat_hiring))
        .with_state(state)
}
