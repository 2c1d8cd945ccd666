use crate::Core::region::QueueRegion;
use crate::MPMC::Buffer::RingBuffer;
use std::fmt;

/// Debug function for QueueRegion
///
/// Shows the region name, size, header location, creator and whether the
/// header is initialised, followed by the ring it carries.
pub fn debug_queue_region(region: &QueueRegion, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("QueueRegion")
        .field("name", &region.name())
        .field("size", &region.size())
        .field("header", &format_args!("{:p}", region.header_ptr()))
        .field("creator_pid", &region.creator_pid())
        .field("initialized", &region.is_initialized())
        .field("buffer", region.buffer())
        .finish()
}

/// Debug function for RingBuffer
///
/// Displays the buffer's memory location and shape; occupancy is read
/// from the shared cursors and may be stale by the time it prints.
pub fn debug_ring_buffer(buffer: &RingBuffer, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RingBuffer")
        .field("base", &format_args!("0x{:x}", buffer.buffer_base as usize))
        .field("capacity", &buffer.capacity)
        .field("slot_payload", &buffer.payload_size)
        .field("len", &buffer.len())
        .finish_non_exhaustive()
}
