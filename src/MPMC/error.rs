use thiserror::Error;

/// Errors raised while setting up a queue, or reported by `put_nowait`.
///
/// `try_get`/`try_put` never return these: an empty or full channel is a
/// normal outcome there, not an error.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("shared memory error: {0}")]
    Io(#[from] std::io::Error),

    #[error("queue is full")]
    Full,

    #[error("encoded message is {size} bytes, slot holds at most {max}")]
    MessageTooLarge { size: usize, max: usize },

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("queue has been shut down")]
    Closed,

    #[error("capacity must be a non-zero power of two that fits in memory, got {0}")]
    InvalidCapacity(usize),

    #[error("max message size must be between 1 and {max} bytes, got {0}", max = u32::MAX)]
    InvalidMessageSize(usize),
}
