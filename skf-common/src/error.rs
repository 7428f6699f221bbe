//! Common error types for SketchFactor

use thiserror::Error;

/// Common result type for SketchFactor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across SketchFactor crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Organization registration collided with an existing slug
    #[error("Duplicate slug: {0}")]
    DuplicateSlug(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Report category outside the closed set
    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    /// Write attempted without an authenticated identity
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Concurrent write contention that could not be resolved
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
