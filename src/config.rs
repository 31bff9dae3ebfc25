use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ADVISOR_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_ADVISOR_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// SQLite file for the durable event log; `None` keeps state in memory only.
    pub database_path: Option<String>,
    pub advisor_api_url: String,
    /// `None` disables the advisor; every advice request then uses the fallback.
    pub advisor_api_key: Option<String>,
    pub advisor_model: String,
    pub advisor_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = non_empty(&env_map, "DATABASE_PATH");

        let advisor_api_url = env_map
            .get("ADVISOR_API_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_ADVISOR_API_URL.to_string());
        if !advisor_api_url.starts_with("http://") && !advisor_api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "ADVISOR_API_URL".to_string(),
                format!("must be an http(s) URL, got {}", advisor_api_url),
            ));
        }

        let advisor_api_key = non_empty(&env_map, "ADVISOR_API_KEY");

        let advisor_model = env_map
            .get("ADVISOR_MODEL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_ADVISOR_MODEL.to_string());

        let advisor_timeout_ms = env_map
            .get("ADVISOR_TIMEOUT_MS")
            .map(|s| s.as_str())
            .unwrap_or("10000")
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "ADVISOR_TIMEOUT_MS".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        Ok(Config {
            port,
            database_path,
            advisor_api_url,
            advisor_api_key,
            advisor_model,
            advisor_timeout: Duration::from_millis(advisor_timeout_ms),
        })
    }
}

fn non_empty(env_map: &HashMap<String, String>, key: &str) -> Option<String> {
    env_map
        .get(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
