// Command Runner Port
// Abstraction for running one external command against one paragraph

use crate::domain::CommandSpec;
use async_trait::async_trait;
use thiserror::Error;

/// Captured outcome of a single dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<i32>,
    pub duration_ms: i64,
    /// Set only when creation, input delivery or completion failed
    pub error: Option<RunError>,
}

impl CommandResult {
    pub fn succeeded(stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code: Some(0),
            ..Default::default()
        }
    }

    pub fn failed(error: RunError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Run errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("failed to start {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("failed to deliver input: {0}")]
    Write(String),

    #[error("{reason}")]
    Execution { code: Option<i32>, reason: String },
}

impl RunError {
    /// Normal termination with a non-zero status
    pub fn exit_status(code: i32) -> Self {
        RunError::Execution {
            code: Some(code),
            reason: format!("exit status {}", code),
        }
    }

    /// Leading text of the user-facing diagnostic line
    pub fn diagnostic_prefix(&self) -> &'static str {
        match self {
            RunError::Spawn { .. } => "error creating command",
            RunError::Write(_) | RunError::Execution { .. } => "error running command",
        }
    }

    /// Full user-facing diagnostic line
    pub fn diagnostic(&self) -> String {
        format!("{}: {}", self.diagnostic_prefix(), self)
    }
}

/// Command Runner trait
///
/// Implementations:
/// - SubprocessRunner: spawns a fresh child process per call
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `spec` once with `input` as its entire stdin
    ///
    /// Never fails as a call: problems are reported through
    /// `CommandResult::error`, alongside whatever stdout/stderr was captured.
    async fn run(&self, spec: &CommandSpec, input: &[u8]) -> CommandResult;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mock runner behavior, selected by program name
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Return the input unchanged (like `cat`)
        Echo,
        /// Return the input upper-cased (like `tr a-z A-Z`)
        Uppercase,
        /// Ignore input and return fixed stdout (like `echo A`)
        Fixed(Vec<u8>),
        /// Echo input, and also write to stderr
        EchoWithStderr(Vec<u8>),
        /// Fail with the given error after writing stderr
        Fail { stderr: Vec<u8>, error: RunError },
        /// Echo input after a delay
        Slow(Duration),
    }

    /// Mock Command Runner for testing
    pub struct MockCommandRunner {
        behaviors: HashMap<String, MockBehavior>,
        calls: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl MockCommandRunner {
        pub fn new() -> Self {
            Self {
                behaviors: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn on(mut self, program: impl Into<String>, behavior: MockBehavior) -> Self {
            self.behaviors.insert(program.into(), behavior);
            self
        }

        /// (command display, input) for every call, in order
        pub fn calls(&self) -> Vec<(String, Vec<u8>)> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Default for MockCommandRunner {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl CommandRunner for MockCommandRunner {
        async fn run(&self, spec: &CommandSpec, input: &[u8]) -> CommandResult {
            self.calls
                .lock()
                .unwrap()
                .push((spec.display().to_string(), input.to_vec()));

            let Some(behavior) = self.behaviors.get(spec.program()).cloned() else {
                return CommandResult::failed(RunError::Spawn {
                    program: spec.program().to_string(),
                    reason: "No such file or directory (os error 2)".to_string(),
                });
            };

            match behavior {
                MockBehavior::Echo => CommandResult::succeeded(input, Vec::new()),
                MockBehavior::Uppercase => {
                    CommandResult::succeeded(input.to_ascii_uppercase(), Vec::new())
                }
                MockBehavior::Fixed(stdout) => CommandResult::succeeded(stdout, Vec::new()),
                MockBehavior::EchoWithStderr(stderr) => CommandResult::succeeded(input, stderr),
                MockBehavior::Fail { stderr, error } => CommandResult {
                    stderr,
                    ..CommandResult::failed(error)
                },
                MockBehavior::Slow(delay) => {
                    tokio::time::sleep(delay).await;
                    CommandResult::succeeded(input, Vec::new())
                }
            }
        }
    }
}
