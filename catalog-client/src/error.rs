use fetch_cache::{BodyError, FetchError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Body(#[from] BodyError),
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// HTTP status of an API error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
