// This is the shared round buffer behind one event queue

use super::layout::ChannelEntry;
use crate::MPMC::Structs::Buffer_Structs::MessageMeta;

use std::sync::atomic::AtomicU64;

/// Default size of the inline payload area of a slot.
/// Channel listings are the largest events we carry, so this is generous.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Slots are laid out on cache-line boundaries.
pub const SLOT_ALIGN: usize = 64;

/// The fixed-size head of a single slot in the ring buffer.
///
/// The inline payload bytes follow the header directly; their length is a
/// per-queue setting stored in `ChannelEntry::slot_payload_size`, so the
/// stride between slots is computed at runtime.
#[repr(C, align(64))]
pub struct SlotHeader {
    /// The sequence number of the slot. This is the core of the synchronization.
    /// - A producer claims a `tail` sequence and waits for the `sequence` in
    ///   the target slot to equal `tail`.
    /// - After writing, it sets the `sequence` to `tail + 1`, signaling completion.
    /// - A consumer waits for the `sequence` in its `head` slot to equal
    ///   `head + 1`.
    pub sequence: AtomicU64,

    /// Transport-only metadata (message ID, timestamp, etc.).
    pub meta: MessageMeta,
}

/// A lock-free, multi-producer, multi-consumer (MPMC) ring buffer view.
///
/// This struct is NOT stored in shared memory. It is a transient view that holds
/// pointers to the shared memory region.
///
/// ### Concurrency Design:
/// - **Producers (Enqueue)**: Producers claim a slot by atomically incrementing `tail`.
///   They use the `sequence` field in the `SlotHeader` to know when the slot is free to
///   be written.
/// - **Consumers (Dequeue)**: Consumers claim a message by atomically incrementing `head`.
///   They use the `sequence` field to know when a message has been fully written by a producer.
pub struct RingBuffer {
    /// Pointer to the cursors and shape in the region header.
    pub(crate) metadata: *const ChannelEntry,

    /// Pointer to the start of the data band (array of slots).
    pub(crate) buffer_base: *mut u8,

    /// The capacity of the buffer (number of slots).
    pub(crate) capacity: usize,

    /// A bitmask used to wrap sequence numbers around the buffer.
    /// Calculated as `capacity - 1`.
    pub(crate) mask: usize,

    /// Bytes available for the payload in each slot.
    pub(crate) payload_size: usize,

    /// Distance in bytes between two consecutive slots.
    pub(crate) stride: usize,
}

unsafe impl Send for RingBuffer {}
unsafe impl Sync for RingBuffer {}
