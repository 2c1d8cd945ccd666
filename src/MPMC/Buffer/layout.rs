use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicU32, AtomicU64};

/// Set once the owning side has shut the queue down. Readers return nothing
/// and writers refuse new messages from then on.
pub const CHANNEL_FLAG_CLOSED: u32 = 1 << 0;

/// Cursors and shape of the one ring buffer a region carries.
///
/// Lives in the region header; the slot band starts right after the header.
#[repr(C, align(128))]
pub struct ChannelEntry {
    /// Channel flags (see `CHANNEL_FLAG_CLOSED`).
    /// Atomic because every attached process reads it on the hot path.
    pub flags: AtomicU32,

    /// Signal word for futex-based blocking/waking.
    /// Producers bump this (and wake), consumers wait on it.
    pub signal: AtomicU32,

    /// Number of slots. Always a non-zero power of two.
    pub capacity: u64,

    /// Size in bytes of the inline payload area of every slot.
    pub slot_payload_size: u64,

    /// The "tail" cursor for producers. Atomically incremented to claim a slot for writing.
    pub tail: CachePadded<AtomicU64>,

    /// The "head" cursor for consumers. Atomically incremented to claim a slot for reading.
    pub head: CachePadded<AtomicU64>,
}

/// Header at the very beginning of a queue's shared memory region.
#[repr(C, align(128))]
pub struct RegionHeader {
    /// Identifies the region as an event queue. Stored last by the creator,
    /// so attachers never see a half-initialised ring.
    pub magic: AtomicU64,

    /// The version of the memory layout.
    pub version: u32,

    /// Process that created the region. Used to tell a live owner from a
    /// region left behind by a crash.
    pub creator_pid: u32,

    pub channel: ChannelEntry,
}
