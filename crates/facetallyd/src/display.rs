//! Display sink — consumer of annotated frames, injected into the engine.

use crate::engine::AnnotatedFrame;

/// Renders the latest annotated frame and running count to the operator.
///
/// Implementations must not block: the engine calls `present` on the frame
/// path every tick and only promises "latest values", nothing queued.
pub trait DisplaySink: Send {
    fn present(&mut self, frame: &AnnotatedFrame);
}

/// Log-backed sink: per-tick detail at debug, count changes at info.
#[derive(Default)]
pub struct LogDisplaySink {
    last_count: u64,
}

impl LogDisplaySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySink for LogDisplaySink {
    fn present(&mut self, frame: &AnnotatedFrame) {
        if frame.unique_count != self.last_count {
            self.last_count = frame.unique_count;
            tracing::info!(unique_faces = frame.unique_count, "count updated");
        }
        tracing::debug!(
            seq = frame.frame.sequence,
            faces = frame.regions.len(),
            unique_faces = frame.unique_count,
            "frame presented"
        );
    }
}
