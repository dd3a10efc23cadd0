use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("invalid configuration: missing '{0}' field")]
    MissingKey(String),

    #[error("malformed configuration {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("refusing to delete the active configuration '{0}'")]
    ActiveConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
