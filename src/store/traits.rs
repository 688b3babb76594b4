//! `ChatStore` trait for per-user chat history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::screening::{Message, MessageRole};

/// Title used when a chat has no user message yet.
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Derived titles are cut to this many characters.
const TITLE_MAX_CHARS: usize = 40;

/// A saved chat with its full message log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredChat {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    /// Last conversation snapshot, if the client saved one.
    pub conversation_state: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing entry for the chat sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatSummary {
    pub id: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

/// What a caller hands over when saving.
#[derive(Debug, Clone, Default)]
pub struct ChatUpdate {
    pub messages: Vec<Message>,
    /// Explicit title; derived from the messages when absent or blank.
    pub title: Option<String>,
    pub conversation_state: Option<Value>,
}

/// Backend-agnostic chat history storage, scoped by user id.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Create or replace a chat. Returns the stored row.
    async fn save_chat(
        &self,
        user_id: &str,
        chat_id: &str,
        update: ChatUpdate,
    ) -> Result<StoredChat, DatabaseError>;

    /// Load a chat, or `None` if it does not exist for this user.
    async fn load_chat(&self, user_id: &str, chat_id: &str)
    -> Result<Option<StoredChat>, DatabaseError>;

    /// All chats for a user, most recently updated first.
    async fn list_chats(&self, user_id: &str) -> Result<Vec<ChatSummary>, DatabaseError>;

    /// Delete a chat. Returns whether anything was removed.
    async fn delete_chat(&self, user_id: &str, chat_id: &str) -> Result<bool, DatabaseError>;
}

/// Short random chat id (8 hex chars).
pub fn new_chat_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Title for a chat: the explicit one, else the first user message cut to
/// 40 characters, else "New Chat".
pub fn chat_title(explicit: Option<&str>, messages: &[Message]) -> String {
    if let Some(title) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return title.to_string();
    }

    messages
        .iter()
        .find(|m| m.role == MessageRole::User)
        .map(|m| m.content.trim().chars().take(TITLE_MAX_CHARS).collect::<String>())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_CHAT_TITLE.to_string())
}
