//! Talent Scout: conversational candidate screening service.

pub mod api;
pub mod config;
pub mod documents;
pub mod error;
mod lenient;
pub mod llm;
pub mod screening;
pub mod store;
