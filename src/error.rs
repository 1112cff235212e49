// Error types shared by the sequence builder, the render bridge and the track API

use thiserror::Error;

/// Sequencer error types
#[derive(Debug, Error)]
pub enum SequencerError {
    /// A note event was rejected at `add` time; the sequence is unchanged.
    #[error("Invalid note event: {0}")]
    InvalidEvent(String),

    /// Settings were rejected; the previous settings remain in force.
    #[error("Invalid sequence settings: {0}")]
    InvalidSettings(String),

    /// No render pipeline is available yet. Recoverable: retry once the host node
    /// is attached.
    #[error("Render pipeline not attached: {0}")]
    NotAttached(String),

    #[error("Transport command queue is full")]
    CommandQueueFull,

    /// Real-time discipline was broken. Never returned, only raised as a panic.
    #[error("Concurrency violation: {0}")]
    ConcurrencyViolation(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SequencerResult<T> = Result<T, SequencerError>;

/// Abort on a broken real-time invariant.
#[cold]
pub(crate) fn concurrency_violation(what: &'static str) -> ! {
    panic!("{}", SequencerError::ConcurrencyViolation(what))
}
