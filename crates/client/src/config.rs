use std::time::Duration;

use crate::error::ClientError;

/// Connection settings for the spot API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API server, without a trailing slash.
    pub api_url: String,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from the environment (and `.env`, if present).
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `CATCHLOG_API_URL`           | `http://localhost:3000` |
    /// | `CATCHLOG_API_TOKEN`         | --                      |
    /// | `CATCHLOG_API_TIMEOUT_SECS`  | `30`                    |
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();

        let api_url = std::env::var("CATCHLOG_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "CATCHLOG_API_URL must be an http(s) URL, got '{api_url}'"
            )));
        }

        let token = std::env::var("CATCHLOG_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let timeout_secs = match std::env::var("CATCHLOG_API_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ClientError::Config(format!("CATCHLOG_API_TIMEOUT_SECS is not a number: '{raw}'"))
            })?,
            Err(_) => 30,
        };

        Ok(Self {
            api_url,
            token,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
