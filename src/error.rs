//! Application error type shared across repositories, prompts and the menu.
//!
//! Recoverable outcomes (not found, duplicates, cancellation) are their own
//! variants so the menu layer can turn them into user-facing messages instead
//! of tearing the session down. Everything unclassified travels as `anyhow`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness rule was violated (duplicate email / dish name).
    #[error("{0}")]
    Duplicate(String),

    /// The order workflow finished with zero line items (soft-abort).
    #[error("an order must contain at least one item")]
    EmptyOrder,

    /// The user cancelled the current operation at a prompt.
    #[error("operation cancelled")]
    Cancelled,

    /// The terminal prompt itself failed (not a cancellation).
    #[error("prompt error: {0}")]
    Prompt(#[source] inquire::InquireError),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection error: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<inquire::InquireError> for AppError {
    fn from(err: inquire::InquireError) -> Self {
        match err {
            inquire::InquireError::OperationCanceled
            | inquire::InquireError::OperationInterrupted => AppError::Cancelled,
            other => AppError::Prompt(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
