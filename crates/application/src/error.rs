use evidence_deck_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("invalid operation: {0}")]
    InvalidOperation(#[source] DomainError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("export failed: {0}")]
    Export(String),
}

impl From<DomainError> for ApplicationError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::PhotoNotFound(id) => Self::NotFound(format!("photo id={id}")),
            other => Self::InvalidOperation(other),
        }
    }
}
