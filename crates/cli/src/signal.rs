//! Termination signal wiring

use piper_core::application::ShutdownSender;
use piper_core::port::DiagnosticSink;
use std::io;
use std::sync::Arc;
use tracing::{info, warn};

const SIGNAL_DIAGNOSTIC_PREFIX: &str = "Received signal";

/// Resolve on the first SIGINT or SIGTERM, naming the signal
async fn wait_for_termination() -> io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            received = tokio::signal::ctrl_c() => received.map(|_| "SIGINT"),
            _ = terminate.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map(|_| "ctrl-c")
    }
}

/// Request shutdown of the dispatch loop when a termination signal arrives
pub async fn forward_termination(shutdown: ShutdownSender, sink: Arc<dyn DiagnosticSink>) {
    match wait_for_termination().await {
        Ok(signal) => request_shutdown(signal, &shutdown, sink.as_ref()),
        Err(e) => warn!(error = %e, "Signal handlers unavailable"),
    }
}

/// Tell the user why the run stops, then stop taking paragraphs
fn request_shutdown(signal: &str, shutdown: &ShutdownSender, sink: &dyn DiagnosticSink) {
    info!(signal, "Received signal, shutting down");
    sink.record(&format!("{}: {}", SIGNAL_DIAGNOSTIC_PREFIX, signal));
    shutdown.shutdown();
}
