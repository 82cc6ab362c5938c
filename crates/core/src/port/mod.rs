// Port Layer - Interfaces for external collaborators

pub mod command_runner;
pub mod diagnostic_sink;
pub mod input_tap;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use command_runner::{CommandResult, CommandRunner, RunError};
pub use diagnostic_sink::DiagnosticSink;
pub use input_tap::{BoxedInput, InputObserver, InputTap, ObservedInput};
pub use time_provider::TimeProvider;
