// Diagnostic Sink Port
// Explicitly passed channel for user-facing diagnostic lines (no global logger)

/// Records one human-readable diagnostic line, without a trailing newline
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, line: &str);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Keeps recorded lines in memory
    #[derive(Default)]
    pub struct MemorySink {
        lines: Mutex<Vec<String>>,
    }

    impl MemorySink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }
    }

    impl DiagnosticSink for MemorySink {
        fn record(&self, line: &str) {
            self.lines.lock().unwrap().push(line.to_string());
        }
    }
}
