// src/MPMC/queue.rs

use crate::Core::region::QueueRegion;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How long a polling receive waits when the caller does not say.
pub const DEFAULT_POLLING_TIMEOUT: Duration = Duration::from_millis(20);

/// How long a queue operation may wait for the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Single attempt, return immediately.
    NoWait,
    /// Wait for at most the specified duration.
    Duration(Duration),
}

impl Default for Timeout {
    fn default() -> Self {
        Self::Duration(DEFAULT_POLLING_TIMEOUT)
    }
}

impl From<Duration> for Timeout {
    fn from(d: Duration) -> Self {
        Self::Duration(d)
    }
}

impl From<Option<Duration>> for Timeout {
    fn from(d: Option<Duration>) -> Self {
        d.map_or(Self::NoWait, Self::Duration)
    }
}

pub(crate) struct QueueInner {
    pub(crate) region: QueueRegion,
    pub(crate) sequence_counter: AtomicU64,
    /// The creating side owns the name and unlinks it on shutdown or drop.
    pub(crate) is_creator: bool,
    unlinked: AtomicBool,
}

impl QueueInner {
    /// Remove the region's name once. Only the creating side does this.
    fn unlink(&self) {
        if !self.is_creator || self.unlinked.swap(true, Ordering::AcqRel) {
            return;
        }
        let name = self.region.name();
        if let Err(e) = crate::Core::SharedMemory::unlink_shared_memory(name) {
            log::warn!("failed to unlink shared memory region {name}: {e}");
        }
    }
}

impl Drop for QueueInner {
    fn drop(&mut self) {
        if self.is_creator && !self.unlinked.load(Ordering::Acquire) {
            log::debug!("queue {} dropped without shutdown", self.region.name());
        }
        self.unlink();
    }
}

/// A bounded FIFO of [`Message`](crate::Message)s shared between processes.
///
/// One handle maps a named shared memory region. Clones share the mapping;
/// other processes reach the same queue through
/// [`EventQueueBuilder::attach`](crate::EventQueueBuilder::attach).
///
/// When the creator's last handle goes away without
/// [`shutdown`](Self::shutdown), the name is still removed.
///
/// Empty and full channels are ordinary outcomes: `try_get` returns `None`,
/// `try_put` returns `false`. Every message is handed to exactly one
/// consumer, in the order it entered the channel.
#[derive(Clone)]
pub struct BoundedEventQueue {
    pub(crate) inner: Arc<QueueInner>,
}

impl BoundedEventQueue {
    pub(crate) fn new(region: QueueRegion, is_creator: bool) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                region,
                sequence_counter: AtomicU64::new(0),
                is_creator,
                unlinked: AtomicBool::new(false),
            }),
        }
    }

    /// Flush the queue and release it.
    ///
    /// The channel is marked closed first, so every other handle (in this or
    /// any other process) stops accepting and returning messages. Whatever is
    /// still queued, including a put that raced with the close, is then
    /// drained and discarded. Returns how many messages were discarded.
    ///
    /// The creating side also removes the region's name; mappings held by
    /// other processes stay valid until they drop their handles.
    pub fn shutdown(self) -> usize {
        self.inner.region.buffer().close();

        let flushed = std::iter::from_fn(|| self.receive(Timeout::default(), false)).count();
        self.inner.unlink();

        let name = self.name();
        if flushed > 0 {
            log::warn!("queue {name} shut down with {flushed} undelivered message(s)");
        } else {
            log::debug!("queue {name} shut down");
        }

        flushed
    }

    /// Name of the shared memory region backing this queue.
    pub fn name(&self) -> &str {
        self.inner.region.name()
    }

    /// Number of slots in the queue.
    pub fn capacity(&self) -> usize {
        self.inner.region.buffer().capacity()
    }

    /// Largest encoded message a slot can hold, in bytes.
    pub fn max_message_size(&self) -> usize {
        self.inner.region.buffer().payload_size()
    }

    /// Approximate number of queued messages. Stale as soon as it returns.
    pub fn len(&self) -> usize {
        self.inner.region.buffer().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once any handle has called [`shutdown`](Self::shutdown).
    pub fn is_closed(&self) -> bool {
        self.inner.region.buffer().is_closed()
    }
}

impl fmt::Debug for BoundedEventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedEventQueue")
            .field("name", &self.name())
            .field("region", &self.inner.region)
            .field("creator", &self.inner.is_creator)
            .field("closed", &self.is_closed())
            .finish()
    }
}
