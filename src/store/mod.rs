//! Persistence layer: libSQL-backed chat history.

pub mod libsql_backend;
pub mod migrations;
pub mod routes;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use routes::{ChatRouteState, chat_routes};
pub use traits::{ChatStore, ChatSummary, ChatUpdate, StoredChat, chat_title, new_chat_id};
