// Piper Infrastructure - System Adapters
// Implements: CommandRunner, InputTap, DiagnosticSink

pub mod logging_tap;
pub mod stderr_sink;
pub mod subprocess_runner;

pub use logging_tap::LoggingTap;
pub use stderr_sink::StderrSink;
pub use subprocess_runner::SubprocessRunner;
