// Application Layer - Segmentation, dispatch and transcript rendering

pub mod dispatch;
pub mod segmenter;
pub mod transcript;

// Re-exports
pub use dispatch::{
    shutdown_channel, Orchestrator, RunSummary, ShutdownSender, ShutdownToken, StopReason,
};
pub use segmenter::{spawn_reader, Segmenter};
pub use transcript::Block;
