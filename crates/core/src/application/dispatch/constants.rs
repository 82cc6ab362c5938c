// Dispatch constants (no magic values)
use std::time::Duration;

/// Paragraphs buffered between the stdin reader and the dispatch loop.
/// One slot: the reader stays at most one paragraph ahead.
pub const PARAGRAPH_CHANNEL_CAPACITY: usize = 1;

/// How long an in-flight dispatch may keep running after a termination signal
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Name of the dedicated stdin reader thread
pub const READER_THREAD_NAME: &str = "piper-stdin";

/// Leading text of the diagnostic emitted when the input stream fails
pub const READ_DIAGNOSTIC_PREFIX: &str = "error reading input";
