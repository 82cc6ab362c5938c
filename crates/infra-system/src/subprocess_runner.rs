// Subprocess runner implementation
// reason: async-trait, tokio for async process management
use async_trait::async_trait;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::debug;

use piper_core::domain::CommandSpec;
use piper_core::port::{BoxedInput, CommandResult, CommandRunner, InputTap, RunError, TimeProvider};

/// Subprocess runner
/// Spawns a fresh child process per call; nothing is reused across paragraphs
pub struct SubprocessRunner {
    time_provider: Arc<dyn TimeProvider>,
    tap: Option<Arc<dyn InputTap>>,
}

impl SubprocessRunner {
    /// Create a new subprocess runner
    ///
    /// # Arguments
    /// * `time_provider` - Time provider for duration tracking
    ///
    /// # Example
    /// ```ignore
    /// let runner = SubprocessRunner::new(Arc::new(SystemTimeProvider))
    ///     .with_tap(Arc::new(LoggingTap));
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            time_provider,
            tap: None,
        }
    }

    /// Interpose `tap` on every child's stdin
    pub fn with_tap(mut self, tap: Arc<dyn InputTap>) -> Self {
        self.tap = Some(tap);
        self
    }

    fn spawn(&self, spec: &CommandSpec) -> Result<Child, RunError> {
        Command::new(spec.program())
            .args(spec.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RunError::Spawn {
                program: spec.program().to_string(),
                reason: e.to_string(),
            })
    }

    /// Write all of `input`, then close stdin
    ///
    /// A broken pipe means the child stopped reading (e.g. `echo`); its exit
    /// status decides success, not the write.
    async fn deliver(mut stdin: BoxedInput, input: &[u8]) -> Result<(), RunError> {
        let written = async {
            stdin.write_all(input).await?;
            stdin.shutdown().await
        };

        match written.await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("Command closed its input before reading all of it");
                Ok(())
            }
            Err(e) => Err(RunError::Write(e.to_string())),
        }
    }

    async fn execute_internal(&self, spec: &CommandSpec, input: &[u8]) -> CommandResult {
        let start_time = self.time_provider.now_millis();

        debug!(
            command = %spec,
            input_bytes = input.len(),
            "Starting command"
        );

        let mut child = match self.spawn(spec) {
            Ok(child) => child,
            Err(e) => return CommandResult::failed(e),
        };

        let stdin = child.stdin.take().map(|s| {
            let boxed: BoxedInput = Box::new(s);
            match &self.tap {
                Some(tap) => tap.wrap(boxed),
                None => boxed,
            }
        });
        let delivery = async move {
            match stdin {
                Some(stdin) => Self::deliver(stdin, input).await,
                None => Err(RunError::Write("stdin was not captured".to_string())),
            }
        };

        // Feed stdin while draining stdout/stderr so large paragraphs cannot deadlock
        let (delivered, waited) = tokio::join!(delivery, child.wait_with_output());
        let duration_ms = self.time_provider.elapsed_since(start_time);

        let output = match waited {
            Ok(output) => output,
            Err(e) => {
                return CommandResult {
                    duration_ms,
                    ..CommandResult::failed(RunError::Execution {
                        code: None,
                        reason: format!("wait failed: {}", e),
                    })
                }
            }
        };

        let error = delivered.err().or_else(|| exit_error(output.status));

        debug!(
            command = %spec,
            duration_ms = %duration_ms,
            exit_code = ?output.status.code(),
            failed = error.is_some(),
            "Command completed"
        );

        CommandResult {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.status.code(),
            duration_ms,
            error,
        }
    }
}

/// Map a non-successful exit status to an execution error
fn exit_error(status: ExitStatus) -> Option<RunError> {
    if status.success() {
        return None;
    }
    if let Some(code) = status.code() {
        return Some(RunError::exit_status(code));
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;

        if let Some(signal) = status.signal() {
            return Some(RunError::Execution {
                code: None,
                reason: format!("terminated by signal {}", signal),
            });
        }
    }

    Some(RunError::Execution {
        code: None,
        reason: "terminated abnormally".to_string(),
    })
}

#[async_trait]
impl CommandRunner for SubprocessRunner {
    async fn run(&self, spec: &CommandSpec, input: &[u8]) -> CommandResult {
        self.execute_internal(spec, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use piper_core::port::time_provider::SystemTimeProvider;
    use piper_core::port::{InputObserver, ObservedInput};
    use std::sync::Mutex;

    fn runner() -> SubprocessRunner {
        SubprocessRunner::new(Arc::new(SystemTimeProvider))
    }

    fn spec(command: &str) -> CommandSpec {
        CommandSpec::parse(command).unwrap()
    }

    #[tokio::test]
    async fn test_run_cat_returns_input() {
        let result = runner().run(&spec("cat"), b"a\nb\n").await;

        assert!(result.is_success(), "{:?}", result.error);
        assert_eq!(result.stdout, b"a\nb\n");
        assert!(result.stderr.is_empty());
        assert_eq!(result.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_run_with_args() {
        let result = runner().run(&spec("tr a-z A-Z"), b"hi\n").await;

        assert!(result.is_success());
        assert_eq!(result.stdout, b"HI\n");
    }

    #[tokio::test]
    async fn test_command_ignoring_input() {
        let result = runner().run(&spec("echo A"), b"ignored\n").await;

        assert!(result.is_success(), "{:?}", result.error);
        assert_eq!(result.stdout, b"A\n");
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let result = runner()
            .run(&spec("piper-definitely-not-a-command"), b"x\n")
            .await;

        assert!(matches!(
            result.error,
            Some(RunError::Spawn { ref program, .. }) if program == "piper-definitely-not-a-command"
        ));
        assert!(result.stdout.is_empty());
    }

    #[tokio::test]
    async fn test_non_zero_exit_keeps_stderr() {
        let spec = CommandSpec::new(
            "sh",
            vec!["-c".to_string(), "echo oops >&2; exit 3".to_string()],
        );
        let result = runner().run(&spec, b"").await;

        assert_eq!(result.error, Some(RunError::exit_status(3)));
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.stderr, b"oops\n");
    }

    #[tokio::test]
    async fn test_large_input_does_not_deadlock() {
        let input: Vec<u8> = b"0123456789abcdef\n".repeat(64 * 1024);
        let result = runner().run(&spec("cat"), &input).await;

        assert!(result.is_success());
        assert_eq!(result.stdout.len(), input.len());
        assert_eq!(result.stdout, input);
    }

    #[derive(Clone, Default)]
    struct CaptureObserver(Arc<Mutex<Vec<u8>>>);

    impl InputObserver for CaptureObserver {
        fn on_bytes(&mut self, chunk: &[u8]) {
            self.0.lock().unwrap().extend_from_slice(chunk);
        }
    }

    struct CaptureTap(CaptureObserver);

    impl InputTap for CaptureTap {
        fn wrap(&self, next: BoxedInput) -> BoxedInput {
            Box::new(ObservedInput::new(next, self.0.clone()))
        }
    }

    #[tokio::test]
    async fn test_tap_sees_input_and_preserves_it() {
        let observer = CaptureObserver::default();
        let runner = runner().with_tap(Arc::new(CaptureTap(observer.clone())));

        let result = runner.run(&spec("cat"), b"tapped\nlines\n").await;

        assert_eq!(result.stdout, b"tapped\nlines\n");
        assert_eq!(*observer.0.lock().unwrap(), b"tapped\nlines\n");
    }
}
