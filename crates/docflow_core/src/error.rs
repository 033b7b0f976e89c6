use thiserror::Error;

/// The workflow error taxonomy. Every guard in the core returns one of
/// these; callers match on the variant, never on message text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid submission route: {0}")]
    InvalidRoute(String),

    #[error("Submission has already been reviewed")]
    AlreadyReviewed,

    #[error("Signer already holds an effective {0} signature on this document")]
    AlreadySigned(String),

    #[error("Document is locked")]
    DocumentLocked,

    #[error("Concurrent modification on {0}")]
    ConcurrentModification(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type Result<T> = std::result::Result<T, Error>;
