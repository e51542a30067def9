/// Errors produced while performing a request.
///
/// Cloneable so one failed in-flight call can be handed to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Request task aborted: {0}")]
    Aborted(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Errors produced while reading a response body.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("Response body has already been read")]
    AlreadyRead,
    #[error("Response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
