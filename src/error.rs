use thiserror::Error;

/// Error taxonomy for a recording session.
///
/// `Allocation`, `Capture` and `Internal` are fatal to the current run;
/// `Persist` and `Range` are recoverable at the call site.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("failed to allocate frame buffers: {0}")]
    Allocation(String),

    #[error("frame capture failed: {0}")]
    Capture(String),

    #[error("failed to persist frame: {0}")]
    Persist(String),

    #[error("invalid range selection ({start}, {end}) for {len} frames")]
    Range {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("internal invariant violated: {0}")]
    Internal(String),
}
