use super::error::QueueError;
use super::queue::BoundedEventQueue;
use crate::Core::region::QueueRegion;
use crate::MPMC::Buffer::DEFAULT_MAX_MESSAGE_SIZE;

/// Configures a [`BoundedEventQueue`] and opens one of its two ends.
///
/// The supervisor calls [`create`](Self::create) once per logical pipe; the
/// processes it spawns call [`attach`](Self::attach) with the same name.
#[derive(Debug, Clone)]
pub struct EventQueueBuilder {
    name: String,
    capacity: usize,
    max_message_size: usize,
}

impl EventQueueBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capacity: 64,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    /// Number of slots. Must be a power of two.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Largest encoded message, in bytes, a slot can hold.
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Create the shared memory region and lay out an empty queue in it.
    ///
    /// A region under the same name is never reused while its creator is
    /// still running: that case fails with an `AlreadyExists` I/O error. A
    /// region left behind by a creator that has exited is replaced.
    pub fn create(self) -> Result<BoundedEventQueue, QueueError> {
        if self.capacity == 0
            || !self.capacity.is_power_of_two()
            || QueueRegion::required_size(self.capacity, self.max_message_size).is_none()
        {
            return Err(QueueError::InvalidCapacity(self.capacity));
        }
        // Slot headers record the payload length as a u32
        if self.max_message_size == 0 || u32::try_from(self.max_message_size).is_err() {
            return Err(QueueError::InvalidMessageSize(self.max_message_size));
        }

        let region = QueueRegion::create(&self.name, self.capacity, self.max_message_size)?;

        log::debug!(
            "created queue {} ({} slots of {} bytes)",
            self.name,
            self.capacity,
            self.max_message_size
        );

        Ok(BoundedEventQueue::new(region, true))
    }

    /// Attach to a queue created by another handle, usually in another process.
    ///
    /// Capacity and message size come from the region; the values set on
    /// this builder are ignored.
    pub fn attach(self) -> Result<BoundedEventQueue, QueueError> {
        let region = QueueRegion::attach(&self.name)?;

        log::debug!(
            "attached to queue {} ({} slots)",
            self.name,
            region.buffer().capacity()
        );

        Ok(BoundedEventQueue::new(region, false))
    }
}
