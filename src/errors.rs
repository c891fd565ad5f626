// errors.rs
use thiserror::Error;

/// Failures raised by the backing store. These are the only errors the
/// catalog surfaces to callers; normalization and date parsing degrade instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Open DB failed: {0}")]
    Open(String),
    #[error("Query failed: {0}")]
    Query(String),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Connection slot unavailable")]
    Unavailable,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Query(e.to_string())
    }
}

/// Errors originating from either the server logic
/// (routing, missing resources, etc.) or downstream layers (store).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Database Error: {0}")]
    Store(#[from] StoreError),
    #[error("Internal Server Error")]
    InternalError,
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::Store(_) | ServerError::InternalError => 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
