//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Composition failed: {0}")]
    Media(#[from] reel_media::MediaError),

    #[error("Invalid compose config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Check if a later run could succeed without changing inputs.
    ///
    /// Output write failures (e.g. a locked destination) are transient;
    /// missing assets and bad configuration are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WorkerError::Io(_) | WorkerError::Media(reel_media::MediaError::AssemblyWrite { .. })
        )
    }
}
