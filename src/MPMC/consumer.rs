// src/MPMC/consumer.rs

use super::queue::{BoundedEventQueue, Timeout};
use crate::MPMC::Structs::Buffer_Structs::{MessageMeta, META_FLAG_JSON};
use crate::MPMC::Structs::Message;
use std::iter::FusedIterator;
use std::time::{Duration, Instant};

/// Longest single futex wait when the caller's timeout has no deadline.
const UNBOUNDED_WAIT_SLICE: Duration = Duration::from_secs(1);

impl BoundedEventQueue {
    /// Receives a message, waiting up to `timeout` for one to arrive.
    ///
    /// # Returns
    /// * `Some(message)` as soon as one is available
    /// * `None` if nothing arrived in time, or the queue has been shut down
    ///
    /// `Timeout::NoWait` makes a single attempt.
    pub fn try_get(&self, timeout: impl Into<Timeout>) -> Option<Message> {
        self.receive(timeout.into(), true)
    }

    /// Lazily yields queued messages until a default-timeout receive comes back empty.
    ///
    /// Other consumers may be taking messages at the same time, so this is a
    /// best-effort drain of what this handle manages to receive.
    pub fn drain(&self) -> Drain<'_> {
        Drain {
            queue: self,
            done: false,
        }
    }

    pub(crate) fn receive(&self, timeout: Timeout, stop_when_closed: bool) -> Option<Message> {
        let buffer = self.inner.region.buffer();
        // `None`: no representable deadline, wait until a message or the close
        let deadline = match timeout {
            Timeout::NoWait => Some(Instant::now()),
            Timeout::Duration(d) => Instant::now().checked_add(d),
        };

        loop {
            if stop_when_closed && buffer.is_closed() {
                return None;
            }

            // Read the signal before looking, so a publish in between wakes us
            let seen = buffer.signal_value();
            if let Some((meta, payload)) = buffer.dequeue() {
                match decode(&meta, &payload) {
                    Some(message) => return Some(message),
                    None => continue,
                }
            }

            let wait = match deadline {
                Some(at) => at.saturating_duration_since(Instant::now()),
                None => UNBOUNDED_WAIT_SLICE,
            };
            if wait.is_zero() {
                return None;
            }
            buffer.wait_for_data_timeout(seen, wait);
        }
    }
}

fn decode(meta: &MessageMeta, payload: &[u8]) -> Option<Message> {
    if meta.flags & META_FLAG_JSON == 0 {
        log::error!(
            "discarding message {} from pid {}: unknown payload encoding (flags {:#x})",
            meta.message_id,
            meta.sender_pid,
            meta.flags
        );
        return None;
    }

    match serde_json::from_slice(payload) {
        Ok(message) => Some(message),
        Err(e) => {
            log::error!(
                "discarding message {} from pid {}: {e}",
                meta.message_id,
                meta.sender_pid
            );
            None
        }
    }
}

/// Iterator returned by [`BoundedEventQueue::drain`].
///
/// Ends for good at the first empty receive; call `drain` again for a new pass.
pub struct Drain<'a> {
    queue: &'a BoundedEventQueue,
    done: bool,
}

impl Iterator for Drain<'_> {
    type Item = Message;

    fn next(&mut self) -> Option<Message> {
        if self.done {
            return None;
        }
        let next = self.queue.try_get(Timeout::default());
        self.done = next.is_none();
        next
    }
}

impl FusedIterator for Drain<'_> {}
