use catchlog_core::error::CoreError;

/// Fallback banner text when a failure carries no usable message.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors surfaced by the spot store and the editor page.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Local input problem, detected before any network call.
    #[error("{0}")]
    Validation(String),

    /// The API answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The `error` field of the response body, or the raw body.
        message: String,
    },

    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Text for the inline error banner.
    pub fn display_message(&self) -> String {
        let message = match self {
            Self::Validation(msg) => msg.clone(),
            Self::Api { message, .. } => message.clone(),
            Self::Request(err) => err.to_string(),
            Self::Config(msg) => msg.clone(),
        };
        if message.trim().is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::Validation(msg),
            other => Self::Validation(other.to_string()),
        }
    }
}
