//! piper - runs a command on every blank-line separated paragraph of stdin,
//! optionally diffing it against a reference command

mod logging;
mod signal;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::io::BufReader;
use std::sync::Arc;
use tracing::info;

use piper_core::application::{shutdown_channel, spawn_reader, Orchestrator, StopReason};
use piper_core::domain::RunConfig;
use piper_core::port::time_provider::SystemTimeProvider;
use piper_core::port::DiagnosticSink;
use piper_infra_system::{LoggingTap, StderrSink, SubprocessRunner};

#[derive(Parser, Debug)]
#[command(name = "piper")]
#[command(
    about = "Run a command on every blank-line separated paragraph of stdin",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// The command to run
    #[arg(short = 'c', value_name = "COMMAND", env = "PIPER_COMMAND")]
    command: Option<String>,

    /// (optional) The command to diff against
    #[arg(short = 'd', value_name = "COMMAND", env = "PIPER_DIFF_COMMAND")]
    diff: Option<String>,

    /// (optional) Show output only
    #[arg(short = 'o', env = "PIPER_OUTPUT_ONLY")]
    output_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging (stderr only)
    logging::init()?;

    // 2. Load configuration
    let cli = Cli::parse();
    let Ok(config) =
        RunConfig::from_flags(cli.command.as_deref(), cli.diff.as_deref(), cli.output_only)
    else {
        eprintln!("{}", Cli::command().render_help());
        return Ok(());
    };

    info!(
        version = piper_core::VERSION,
        mode = ?config.mode(),
        "piper starting"
    );

    // 3. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let sink: Arc<dyn DiagnosticSink> = Arc::new(StderrSink);
    let runner = Arc::new(SubprocessRunner::new(time_provider).with_tap(Arc::new(LoggingTap)));

    // 4. Wire termination signals
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    tokio::spawn(signal::forward_termination(shutdown_tx, Arc::clone(&sink)));

    // 5. Start the stdin reader
    let paragraphs = spawn_reader(BufReader::new(std::io::stdin()), Arc::clone(&sink))
        .context("Failed to start stdin reader")?;

    // 6. Dispatch until input ends or a signal arrives
    let orchestrator = Orchestrator::new(config, runner, sink);
    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();
    let summary = orchestrator
        .run(paragraphs, &mut stdout, &mut stderr, shutdown_rx)
        .await
        .context("Failed to write transcript")?;

    if summary.stop_reason == StopReason::Interrupted {
        info!("Execution cancelled");
    }

    Ok(())
}
