//! LLM integration for Talent Scout.
//!
//! Supports:
//! - **Groq**: OpenAI-compatible chat completions API
//! - **OpenAI**: Direct API access
//!
//! Both backends speak the same wire format, so a single
//! `OpenAiCompatProvider` serves them; only the base URL, key and default
//! model differ.

pub mod json;
pub mod openai;
pub mod provider;

pub use json::{complete_json, extract_json_object, parse_json_object};
pub use openai::OpenAiCompatProvider;
pub use provider::*;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ConfigError, LlmError};

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Groq,
    OpenAi,
}

impl LlmBackend {
    /// Environment variable holding the API key for this backend.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Groq => "llama-3.3-70b-versatile",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }

    /// Short provider name used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::OpenAi => "openai",
        }
    }
}

impl FromStr for LlmBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAi),
            other => Err(ConfigError::InvalidValue {
                key: "TALENT_SCOUT_LLM_BACKEND".to_string(),
                message: format!("unknown backend '{other}' (expected groq or openai)"),
            }),
        }
    }
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
    pub base_url: String,
    /// Upper bound on a single completion call.
    pub timeout: Duration,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider = OpenAiCompatProvider::new(config)?;
    tracing::info!(
        backend = config.backend.name(),
        model = %config.model,
        "LLM provider ready"
    );
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(backend: LlmBackend, model: &str) -> LlmConfig {
        LlmConfig {
            backend,
            api_key: secrecy::SecretString::from("test-key"),
            model: model.to_string(),
            base_url: backend.default_base_url().to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_create_groq_provider() {
        // Construction never touches the network; auth is checked per request.
        let provider = create_provider(&config(LlmBackend::Groq, "llama-3.3-70b-versatile"));
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().model_name(), "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_create_openai_provider() {
        let provider = create_provider(&config(LlmBackend::OpenAi, "gpt-4o"));
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().model_name(), "gpt-4o");
    }

    #[test]
    fn backend_from_str() {
        assert_eq!("groq".parse::<LlmBackend>().unwrap(), LlmBackend::Groq);
        assert_eq!(" OpenAI ".parse::<LlmBackend>().unwrap(), LlmBackend::OpenAi);
        assert!("anthropic".parse::<LlmBackend>().is_err());
    }
}
