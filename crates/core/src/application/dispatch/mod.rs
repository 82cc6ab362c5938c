// Dispatch - sequential paragraph processing loop

pub mod constants;
mod shutdown;

use constants::SHUTDOWN_GRACE_PERIOD;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::transcript::Block;
use crate::domain::{CommandSpec, Paragraph, RunConfig};
use crate::error::Result;
use crate::port::{CommandRunner, DiagnosticSink};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Why the dispatch loop stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopReason {
    /// Input ended and every paragraph was handled
    #[default]
    Exhausted,
    /// A termination request arrived
    Interrupted,
}

/// Counters reported when the loop stops
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub received: usize,
    pub emitted: usize,
    pub matched: usize,
    pub failed: usize,
    pub stop_reason: StopReason,
}

/// What a single paragraph produced
enum Outcome {
    /// Rendered transcript block
    Emit(Vec<u8>),
    /// Diff mode, outputs were identical
    Match,
    /// A command failed; paragraph abandoned
    Failed,
}

/// Orchestrator pulls paragraphs one at a time and dispatches them to the
/// primary (and optional reference) command
pub struct Orchestrator {
    config: RunConfig,
    runner: Arc<dyn CommandRunner>,
    sink: Arc<dyn DiagnosticSink>,
    grace_period: Duration,
}

impl Orchestrator {
    pub fn new(
        config: RunConfig,
        runner: Arc<dyn CommandRunner>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            config,
            runner,
            sink,
            grace_period: SHUTDOWN_GRACE_PERIOD,
        }
    }

    /// Override how long an in-flight dispatch may run after shutdown
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Run the loop until `paragraphs` closes or `shutdown` fires.
    ///
    /// Transcript blocks go to `out`; command stderr is forwarded to `err`.
    /// Block N is written and flushed before paragraph N+1 is received.
    ///
    /// On shutdown no new paragraph is taken. A dispatch already running
    /// gets `grace_period` to finish (and print); after that it is dropped.
    ///
    /// # Errors
    /// - AppError::Io if writing to `out` or `err` fails
    pub async fn run<W, E>(
        &self,
        mut paragraphs: mpsc::Receiver<Paragraph>,
        out: &mut W,
        err: &mut E,
        mut shutdown: ShutdownToken,
    ) -> Result<RunSummary>
    where
        W: AsyncWrite + Unpin,
        E: AsyncWrite + Unpin,
    {
        let mut summary = RunSummary::default();
        info!(
            mode = ?self.config.mode(),
            command = %self.config.primary,
            reference = ?self.config.reference.as_ref().map(CommandSpec::display),
            "Dispatch loop started"
        );

        loop {
            let paragraph = tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    summary.stop_reason = StopReason::Interrupted;
                    break;
                }
                next = paragraphs.recv() => match next {
                    Some(paragraph) => paragraph,
                    None => break,
                },
            };
            summary.received += 1;

            let dispatch = self.dispatch(&paragraph, err);
            tokio::pin!(dispatch);

            let outcome = tokio::select! {
                biased;
                outcome = &mut dispatch => outcome?,
                _ = shutdown.wait() => {
                    summary.stop_reason = StopReason::Interrupted;
                    info!(
                        paragraph = paragraph.index(),
                        grace_ms = self.grace_period.as_millis() as u64,
                        "Termination requested, draining in-flight paragraph"
                    );
                    match tokio::time::timeout(self.grace_period, &mut dispatch).await {
                        Ok(outcome) => outcome?,
                        Err(_) => {
                            warn!(
                                paragraph = paragraph.index(),
                                "Grace period elapsed, abandoning paragraph"
                            );
                            summary.failed += 1;
                            break;
                        }
                    }
                }
            };

            self.record(&paragraph, outcome, out, &mut summary).await?;

            if summary.stop_reason == StopReason::Interrupted {
                break;
            }
        }

        info!(
            received = summary.received,
            emitted = summary.emitted,
            matched = summary.matched,
            failed = summary.failed,
            stop_reason = ?summary.stop_reason,
            "Dispatch loop stopped"
        );
        Ok(summary)
    }

    /// RUN_PRIMARY → (RUN_REFERENCE) → COMPARE, rendering the block if any
    async fn dispatch<E>(&self, paragraph: &Paragraph, err: &mut E) -> Result<Outcome>
    where
        E: AsyncWrite + Unpin,
    {
        let input = paragraph.as_bytes();

        let Some(primary_output) = self.execute(&self.config.primary, paragraph, err).await? else {
            return Ok(Outcome::Failed);
        };

        let Some(reference) = &self.config.reference else {
            let block = Block::Single {
                input,
                output: &primary_output,
            };
            return Ok(Outcome::Emit(block.render(self.config.output_only)));
        };

        let Some(reference_output) = self.execute(reference, paragraph, err).await? else {
            return Ok(Outcome::Failed);
        };

        if primary_output == reference_output {
            return Ok(Outcome::Match);
        }

        let block = Block::Mismatch {
            input,
            primary: &self.config.primary,
            primary_output: &primary_output,
            reference,
            reference_output: &reference_output,
        };
        Ok(Outcome::Emit(block.render(self.config.output_only)))
    }

    /// Run one command, forward its stderr, and return stdout if it succeeded
    async fn execute<E>(
        &self,
        spec: &CommandSpec,
        paragraph: &Paragraph,
        err: &mut E,
    ) -> Result<Option<Vec<u8>>>
    where
        E: AsyncWrite + Unpin,
    {
        let result = self.runner.run(spec, paragraph.as_bytes()).await;

        if !result.stderr.is_empty() {
            err.write_all(&result.stderr).await?;
            err.flush().await?;
        }

        match result.error {
            None => {
                debug!(
                    paragraph = paragraph.index(),
                    command = %spec,
                    exit_code = ?result.exit_code,
                    duration_ms = result.duration_ms,
                    stdout_bytes = result.stdout.len(),
                    "Dispatch completed"
                );
                Ok(Some(result.stdout))
            }
            Some(e) => {
                warn!(
                    paragraph = paragraph.index(),
                    command = %spec,
                    error = %e,
                    "Abandoning paragraph"
                );
                self.sink.record(&e.diagnostic());
                Ok(None)
            }
        }
    }

    async fn record<W>(
        &self,
        paragraph: &Paragraph,
        outcome: Outcome,
        out: &mut W,
        summary: &mut RunSummary,
    ) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        match outcome {
            Outcome::Emit(block) => {
                out.write_all(&block).await?;
                out.flush().await?;
                summary.emitted += 1;
            }
            Outcome::Match => {
                debug!(paragraph = paragraph.index(), "Outputs match, nothing to print");
                summary.matched += 1;
            }
            Outcome::Failed => summary.failed += 1,
        }
        Ok(())
    }
}
