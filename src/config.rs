//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// Default number of history messages rendered into prompts.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Service configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    /// HTTP listen port.
    pub port: u16,
    /// libSQL database file for chat history.
    pub db_path: PathBuf,
    /// How many trailing messages the orchestrator shows the model.
    pub history_window: usize,
    /// Directory for rolling log files. Stderr only when unset.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Build configuration from environment variables.
    ///
    /// The API key for the selected backend is the only required value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match std::env::var("TALENT_SCOUT_LLM_BACKEND") {
            Ok(value) => value.parse::<LlmBackend>()?,
            Err(_) => LlmBackend::Groq,
        };

        let key_var = backend.api_key_env();
        let api_key =
            std::env::var(key_var).map_err(|_| ConfigError::MissingEnvVar(key_var.to_string()))?;

        let model = std::env::var("TALENT_SCOUT_MODEL")
            .unwrap_or_else(|_| backend.default_model().to_string());

        let base_url = std::env::var("TALENT_SCOUT_LLM_BASE_URL")
            .unwrap_or_else(|_| backend.default_base_url().to_string());

        let timeout_secs: u64 = parse_env("TALENT_SCOUT_LLM_TIMEOUT_SECS", 60)?;
        let port: u16 = parse_env("TALENT_SCOUT_PORT", 8000)?;
        let history_window: usize =
            parse_env("TALENT_SCOUT_HISTORY_WINDOW", DEFAULT_HISTORY_WINDOW)?;

        let db_path = std::env::var("TALENT_SCOUT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/talent-scout.db"));

        let log_dir = std::env::var("TALENT_SCOUT_LOG_DIR").ok().map(PathBuf::from);

        Ok(Self {
            llm: LlmConfig {
                backend,
                api_key: secrecy::SecretString::from(api_key),
                model,
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            port,
            db_path,
            history_window,
            log_dir,
        })
    }
}

/// Read and parse an optional env var, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
