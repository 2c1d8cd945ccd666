// In src/MPMC/producer.rs
use super::error::QueueError;
use super::queue::{BoundedEventQueue, Timeout};
use crate::MPMC::Structs::Buffer_Structs::{MessageMeta, META_FLAG_JSON, RUNTIME_RUST};
use crate::MPMC::Structs::Message;
use std::sync::atomic::Ordering;

impl BoundedEventQueue {
    /// Sends a message through the queue without waiting.
    ///
    /// # Returns
    /// * `Ok(())` if the message was enqueued
    /// * `Err(QueueError::Full)` if every slot is taken
    /// * `Err(QueueError::MessageTooLarge)` if the encoded message does not fit a slot
    /// * `Err(QueueError::Closed)` if the queue has been shut down
    pub fn put_nowait(&self, message: &Message) -> Result<(), QueueError> {
        let buffer = self.inner.region.buffer();
        if buffer.is_closed() {
            return Err(QueueError::Closed);
        }

        let encoded = serde_json::to_vec(message)?;

        // Check message size before attempting to enqueue
        let max = buffer.payload_size();
        if encoded.len() > max {
            return Err(QueueError::MessageTooLarge {
                size: encoded.len(),
                max,
            });
        }

        let meta = MessageMeta {
            message_id: self.inner.sequence_counter.fetch_add(1, Ordering::Relaxed),
            timestamp_ns: message.created_at_ns(),
            reserved: 0,
            message_type: message.event_type().code(),
            sender_pid: std::process::id(),
            sender_runtime: RUNTIME_RUST,
            flags: META_FLAG_JSON,
            payload_len: encoded.len() as u32,
        };

        match buffer.enqueue(meta, &encoded) {
            Some(_) => {
                buffer.signal_consumer();
                Ok(())
            }
            None => Err(QueueError::Full),
        }
    }

    /// Tries to enqueue a message, returning whether it was accepted.
    ///
    /// The send never blocks: `_timeout` is accepted for call-site symmetry
    /// with [`try_get`](Self::try_get) but a full queue fails at once.
    /// Failures other than "full" are logged.
    pub fn try_put(&self, message: &Message, _timeout: impl Into<Timeout>) -> bool {
        match self.put_nowait(message) {
            Ok(()) => true,
            Err(QueueError::Full) => {
                log::debug!(
                    "queue {} full, dropped {} from {}",
                    self.name(),
                    message.event_type(),
                    message.source()
                );
                false
            }
            Err(e) => {
                log::error!(
                    "could not pass event {} from {}: {e}",
                    message.event_type(),
                    message.source()
                );
                false
            }
        }
    }
}
