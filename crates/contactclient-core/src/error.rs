use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContactClientError {
    #[error("not initialized: run 'contactclient init'")]
    NotInitialized,

    #[error("malformed record {path}: {reason}")]
    MalformedRecord { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ContactClientError>;
