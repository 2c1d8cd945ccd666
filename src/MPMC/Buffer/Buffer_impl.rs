use std::mem::size_of;
use std::ptr;
use std::sync::atomic::Ordering::{AcqRel, Acquire, Relaxed, Release};
use std::time::Duration;

use super::layout::{ChannelEntry, CHANNEL_FLAG_CLOSED};
use super::Buffer::{RingBuffer, SlotHeader, SLOT_ALIGN};
use crate::Core::futex;
use crate::MPMC::Structs::Buffer_Structs::MessageMeta;

impl RingBuffer {
    /// Create a ring buffer view over an existing memory region.
    ///
    /// Returns `None` if the entry describes an impossible shape: a capacity
    /// that is not a non-zero power of two, or a band that overflows `usize`.
    ///
    /// # Safety
    /// Caller must ensure `metadata` and `buffer_base` are valid pointers to shared memory,
    /// and that the band behind `buffer_base` is at least `band_size(capacity, payload)` bytes.
    pub unsafe fn new(metadata: *const ChannelEntry, buffer_base: *mut u8) -> Option<Self> {
        let capacity = usize::try_from((*metadata).capacity).ok()?;
        let payload_size = usize::try_from((*metadata).slot_payload_size).ok()?;
        if !capacity.is_power_of_two() {
            return None;
        }
        Self::band_size(capacity, payload_size)?;

        Some(Self {
            metadata,
            buffer_base,
            capacity,
            mask: capacity - 1,
            payload_size,
            stride: Self::slot_stride(payload_size)?,
        })
    }

    /// Size in bytes of one slot stride in memory for a given inline payload size.
    #[inline]
    pub fn slot_stride(payload_size: usize) -> Option<usize> {
        let raw = size_of::<SlotHeader>().checked_add(payload_size)?;
        Some(raw.checked_add(SLOT_ALIGN - 1)? & !(SLOT_ALIGN - 1))
    }

    /// Bytes needed for the data band, or `None` if that does not fit in `usize`.
    #[inline]
    pub fn band_size(capacity: usize, payload_size: usize) -> Option<usize> {
        capacity.checked_mul(Self::slot_stride(payload_size)?)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Largest payload a single slot can carry.
    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    /// Initialize per-slot sequence numbers to k for k in 0..capacity.
    /// This should ONLY be called by the creator process.
    ///
    /// # Safety
    /// Caller guarantees the underlying memory is allocated and writable.
    pub unsafe fn init_slots(&self) {
        for k in 0..self.capacity {
            let slot = self.slot_mut(k);
            ptr::write(
                slot,
                SlotHeader {
                    sequence: std::sync::atomic::AtomicU64::new(k as u64),
                    meta: MessageMeta::default(),
                },
            );
        }
    }

    #[inline]
    unsafe fn slot_mut(&self, index: usize) -> *mut SlotHeader {
        let base = self.buffer_base.add(index * self.stride);
        base as *mut SlotHeader
    }

    #[inline]
    unsafe fn payload_mut(slot: *mut SlotHeader) -> *mut u8 {
        (slot as *mut u8).add(size_of::<SlotHeader>())
    }

    #[inline]
    fn entry(&self) -> &ChannelEntry {
        // Safety: the metadata pointer is valid for the lifetime of the RingBuffer view
        unsafe { &*self.metadata }
    }

    /// Enqueue reserves a slot and publishes the message.
    /// Returns the index on success, or None if the ring appears full.
    ///
    /// Payload bytes beyond `payload_size()` are cut off; callers check the size first.
    pub fn enqueue(&self, meta: MessageMeta, payload: &[u8]) -> Option<usize> {
        let tail_atomic = &self.entry().tail;
        let len = payload.len().min(self.payload_size);

        loop {
            let tail = tail_atomic.load(Relaxed);
            let idx = (tail as usize) & self.mask;
            let slot_ptr = unsafe { self.slot_mut(idx) };
            let seq = unsafe { &(*slot_ptr).sequence }.load(Acquire);
            let dif = seq as i64 - tail as i64;

            if dif == 0 {
                if tail_atomic
                    .compare_exchange_weak(tail, tail + 1, AcqRel, Relaxed)
                    .is_ok()
                {
                    // We own this slot now
                    unsafe {
                        (*slot_ptr).meta = meta;
                        (*slot_ptr).meta.payload_len = len as u32;

                        ptr::copy_nonoverlapping(payload.as_ptr(), Self::payload_mut(slot_ptr), len);

                        // Publish
                        (*slot_ptr).sequence.store(tail + 1, Release);
                    }
                    return Some(idx);
                }
                continue;
            } else if dif < 0 {
                // full
                return None;
            } else {
                // another producer moved tail past us; reload and retry
                std::hint::spin_loop();
                continue;
            }
        }
    }

    /// Dequeue acquires a ready slot and returns its content.
    /// Returns None if the ring appears empty.
    pub fn dequeue(&self) -> Option<(MessageMeta, Vec<u8>)> {
        let head_atomic = &self.entry().head;

        loop {
            let head = head_atomic.load(Relaxed);
            let idx = (head as usize) & self.mask;
            let slot_ptr = unsafe { self.slot_mut(idx) };
            let seq = unsafe { &(*slot_ptr).sequence }.load(Acquire);
            let dif = seq as i64 - (head as i64 + 1);

            if dif == 0 {
                if head_atomic
                    .compare_exchange_weak(head, head + 1, AcqRel, Relaxed)
                    .is_ok()
                {
                    let (meta, payload) = unsafe {
                        let meta = (*slot_ptr).meta;
                        let len = (meta.payload_len as usize).min(self.payload_size);
                        let mut payload = vec![0u8; len];
                        ptr::copy_nonoverlapping(
                            Self::payload_mut(slot_ptr),
                            payload.as_mut_ptr(),
                            len,
                        );
                        (meta, payload)
                    };

                    // free slot for future producers
                    unsafe {
                        (*slot_ptr)
                            .sequence
                            .store(head + self.capacity as u64, Release);
                    }
                    return Some((meta, payload));
                }
                continue;
            } else if dif < 0 {
                // empty
                return None;
            } else {
                // another consumer moved head past us; reload and retry
                std::hint::spin_loop();
                continue;
            }
        }
    }

    /// Approximate number of published-or-claimed slots.
    pub fn len(&self) -> usize {
        let entry = self.entry();
        let tail = entry.tail.load(Acquire);
        let head = entry.head.load(Acquire);
        (tail.saturating_sub(head) as usize).min(self.capacity)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current value of the wake-up signal word.
    /// Load this before a dequeue attempt and hand it to `wait_for_data_timeout`.
    pub fn signal_value(&self) -> u32 {
        self.entry().signal.load(Acquire)
    }

    /// Signal consumers that new data is available
    pub fn signal_consumer(&self) {
        let signal = &self.entry().signal;
        signal.fetch_add(1, Release);
        futex::futex_wake(signal, 1);
    }

    /// Wake every waiter regardless of data (used on close).
    pub fn wake_all(&self) {
        let signal = &self.entry().signal;
        signal.fetch_add(1, Release);
        futex::futex_wake(signal, i32::MAX);
    }

    /// Wait until the signal word moves away from `seen` or `timeout` expires.
    /// Spurious returns are possible; callers re-check the ring.
    pub fn wait_for_data_timeout(&self, seen: u32, timeout: Duration) {
        futex::futex_wait_timeout(&self.entry().signal, seen, timeout);
    }

    pub fn is_closed(&self) -> bool {
        self.entry().flags.load(Acquire) & CHANNEL_FLAG_CLOSED != 0
    }

    /// Mark the queue closed for every attached process.
    pub fn close(&self) {
        self.entry().flags.fetch_or(CHANNEL_FLAG_CLOSED, AcqRel);
        self.wake_all();
    }
}
