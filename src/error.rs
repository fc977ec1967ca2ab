use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the external radiation forecast service.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("provider response could not be decoded: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Transport failures and server-side errors are worth another attempt;
    /// client errors and malformed bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Transport(_) => true,
            ProviderError::Status { status, .. } => status.is_server_error(),
            ProviderError::Decode(_) => false,
        }
    }
}

/// Per-plant failure during a sync or estimation pass. The orchestrator
/// logs these and moves on to the next plant.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("plant {plant} has invalid geometry: {reason}")]
    Validation { plant: String, reason: String },
}
