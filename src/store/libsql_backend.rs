//! libSQL backend for `ChatStore`.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Connection, Database as LibSqlDatabase, Row, params};
use tracing::{debug, info, warn};

use crate::error::DatabaseError;
use crate::screening::Message;
use crate::store::migrations;
use crate::store::traits::{ChatStore, ChatSummary, ChatUpdate, StoredChat, chat_title};

/// libSQL database backend.
///
/// Holds a single connection reused for all operations.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Fixed-width RFC 3339 so text ordering matches time ordering.
fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn row_to_chat(row: &Row) -> Result<StoredChat, DatabaseError> {
    let id: String = row
        .get(0)
        .map_err(|e| DatabaseError::Query(format!("chat id: {e}")))?;
    let title: String = row.get(1).unwrap_or_default();
    let messages_json: String = row.get(2).unwrap_or_else(|_| "[]".to_string());
    let state_json: Option<String> = row.get(3).ok();
    let created_str: String = row.get(4).unwrap_or_default();
    let updated_str: String = row.get(5).unwrap_or_default();

    let messages: Vec<Message> = serde_json::from_str(&messages_json)
        .map_err(|e| DatabaseError::Serialization(format!("chat {id} messages: {e}")))?;

    let conversation_state = state_json.and_then(|s| {
        serde_json::from_str(&s)
            .inspect_err(|e| warn!(chat_id = %id, error = %e, "Dropping unreadable chat snapshot"))
            .ok()
    });

    Ok(StoredChat {
        id,
        title,
        messages,
        conversation_state,
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

#[async_trait]
impl ChatStore for LibSqlBackend {
    async fn save_chat(
        &self,
        user_id: &str,
        chat_id: &str,
        update: ChatUpdate,
    ) -> Result<StoredChat, DatabaseError> {
        let conn = self.conn();
        let title = chat_title(update.title.as_deref(), &update.messages);
        let messages_json = serde_json::to_string(&update.messages)
            .map_err(|e| DatabaseError::Serialization(format!("save_chat messages: {e}")))?;
        let state_value = match &update.conversation_state {
            Some(state) => libsql::Value::Text(
                serde_json::to_string(state)
                    .map_err(|e| DatabaseError::Serialization(format!("save_chat state: {e}")))?,
            ),
            None => libsql::Value::Null,
        };
        let now = format_datetime(Utc::now());

        conn.execute(
            "INSERT INTO chats (user_id, id, title, messages, conversation_state, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(user_id, id) DO UPDATE SET
                title = excluded.title,
                messages = excluded.messages,
                conversation_state = excluded.conversation_state,
                updated_at = excluded.updated_at",
            params![user_id, chat_id, title, messages_json, state_value, now],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("save_chat: {e}")))?;

        debug!(user_id, chat_id, messages = update.messages.len(), "Chat saved");

        self.load_chat(user_id, chat_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "chat".to_string(),
                id: chat_id.to_string(),
            })
    }

    async fn load_chat(
        &self,
        user_id: &str,
        chat_id: &str,
    ) -> Result<Option<StoredChat>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                "SELECT id, title, messages, conversation_state, created_at, updated_at
                 FROM chats WHERE user_id = ?1 AND id = ?2",
                params![user_id, chat_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("load_chat: {e}")))?;

        match rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("load_chat: {e}")))?
        {
            Some(row) => Ok(Some(row_to_chat(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_chats(&self, user_id: &str) -> Result<Vec<ChatSummary>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                "SELECT id, title, updated_at FROM chats
                 WHERE user_id = ?1 ORDER BY updated_at DESC, id ASC",
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_chats: {e}")))?;

        let mut chats = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let updated_str: String = row.get(2).unwrap_or_default();
            chats.push(ChatSummary {
                id: row.get(0).unwrap_or_default(),
                title: row.get(1).unwrap_or_default(),
                updated_at: parse_datetime(&updated_str),
            });
        }
        Ok(chats)
    }

    async fn delete_chat(&self, user_id: &str, chat_id: &str) -> Result<bool, DatabaseError> {
        let conn = self.conn();
        let count = conn
            .execute(
                "DELETE FROM chats WHERE user_id = ?1 AND id = ?2",
                params![user_id, chat_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_chat: {e}")))?;
        Ok(count > 0)
    }
}
