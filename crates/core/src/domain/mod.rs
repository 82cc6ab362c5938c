// Domain Layer - Pure values flowing through the pipeline

pub mod command;
pub mod config;
pub mod error;
pub mod paragraph;

// Re-exports
pub use command::CommandSpec;
pub use config::{RunConfig, RunMode};
pub use error::DomainError;
pub use paragraph::Paragraph;
