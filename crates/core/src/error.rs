// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// Per-paragraph command failures never surface here; they are handled
/// inside the dispatch loop. Only broken transcript streams are fatal.
/// Invalid flags are rejected earlier as `DomainError`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
