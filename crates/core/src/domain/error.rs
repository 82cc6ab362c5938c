// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Empty command: expected an executable name")]
    EmptyCommand,
}

pub type Result<T> = std::result::Result<T, DomainError>;
