use reqwest::{Method, StatusCode};

/// Non-successful response of the service.
#[derive(Debug, thiserror::Error)]
#[error("`{method} {path}` has failed with {status}: {body}")]
pub struct ApiError {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,

    /// Error payload: parsed JSON or the raw text wrapped into a JSON string.
    pub body: serde_json::Value,
}

impl ApiError {
    pub fn new(method: Method, path: impl Into<String>, status: StatusCode, body: &str) -> Self {
        Self {
            method,
            path: path.into(),
            status,
            body: serde_json::from_str(body)
                .unwrap_or_else(|_| serde_json::Value::String(body.to_string())),
        }
    }

    /// Tells whether the service rejected the request itself, as opposed to failing.
    #[inline]
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        self.status.is_client_error()
    }
}
