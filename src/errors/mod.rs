use thiserror::Error;

/// Domain errors surfaced by the service layer.
///
/// The split matters to callers: `ValidationFailed` means the input was
/// wrong, `StateConflict` means the world changed underneath the caller
/// (tournament settled, listing taken), `InsufficientFunds` means a balance
/// or quantity check failed before anything was mutated, and
/// `Infrastructure` wraps datastore failures.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("state conflict: {0}")]
    StateConflict(String),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Infrastructure(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        CoreError::StateConflict(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        CoreError::ValidationFailed(msg.into())
    }
}
