use serde_json::Value;
use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection and try again.";
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Failures talking to the marketplace API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never got a response.
    #[error("Network error: {reason}")]
    Network { reason: String },

    /// The server answered with a failure.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The server answered but the body was not what we expected.
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Builds a server error from a failure body, preferring `message`, then `error`.
    pub fn from_response(status: u16, body: &Value) -> Self {
        let field = |key: &str| {
            body.get(key)
                .and_then(Value::as_str)
                .filter(|msg| !msg.trim().is_empty())
        };
        let message = field("message")
            .or_else(|| field("error"))
            .unwrap_or(GENERIC_ERROR_MESSAGE)
            .to_string();

        ApiError::Server { status, message }
    }

    /// Text fit for a transient alert banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network { .. } => NETWORK_ERROR_MESSAGE.to_string(),
            ApiError::Server { message, .. } => message.clone(),
            ApiError::Decode(_) => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Server { status: 401, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network {
                reason: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
