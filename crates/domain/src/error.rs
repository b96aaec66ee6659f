use thiserror::Error;

use crate::PhotoId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("photo id must be positive, got {0}")]
    InvalidPhotoId(i64),
    #[error("order number must be positive, got {0}")]
    InvalidOrderNumber(i64),
    #[error("photo {0} is a copy and cannot be copied")]
    CopyOfCopy(PhotoId),
    #[error("photo {original} already has a copy ({copy})")]
    AlreadyHasCopy { original: PhotoId, copy: PhotoId },
    #[error("photo must be persisted before it can be copied")]
    UnpersistedOriginal,
    #[error("photo number must not be empty")]
    EmptyUidSuffix,
    #[error("photo {0} is not in the list")]
    PhotoNotFound(PhotoId),
    #[error("index {index} is out of bounds for a list of {len} photos")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("photo list invariant broken: {0}")]
    BrokenInvariant(String),
}
