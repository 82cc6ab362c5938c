// Stderr diagnostic sink

use piper_core::port::DiagnosticSink;
use std::io::Write;

/// Writes each diagnostic as one line on the process's stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn record(&self, line: &str) {
        let mut stderr = std::io::stderr().lock();
        // Nowhere left to report a failing stderr
        let _ = writeln!(stderr, "{}", line);
        let _ = stderr.flush();
    }
}
