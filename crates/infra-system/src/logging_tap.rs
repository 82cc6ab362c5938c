// Logging input tap - records what each command receives on stdin

use piper_core::port::{BoxedInput, InputObserver, InputTap, ObservedInput};
use tracing::{debug, enabled, Level};

/// Input tap that logs every paragraph delivered to a child at debug level.
///
/// Bytes are only buffered when debug logging is enabled for this module.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTap;

impl InputTap for LoggingTap {
    fn wrap(&self, next: BoxedInput) -> BoxedInput {
        let observer = LogObserver {
            capture: enabled!(Level::DEBUG),
            ..Default::default()
        };
        Box::new(ObservedInput::new(next, observer))
    }
}

#[derive(Default)]
struct LogObserver {
    capture: bool,
    bytes: usize,
    seen: Vec<u8>,
}

impl InputObserver for LogObserver {
    fn on_bytes(&mut self, chunk: &[u8]) {
        self.bytes += chunk.len();
        if self.capture {
            self.seen.extend_from_slice(chunk);
        }
    }

    fn on_close(&mut self) {
        debug!(
            bytes = self.bytes,
            input = %String::from_utf8_lossy(&self.seen),
            "Delivered input"
        );
    }
}
