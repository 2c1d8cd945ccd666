use crate::Core::SharedMemory::{self, SharedMemoryBackend};
use crate::MPMC::Buffer::layout::{ChannelEntry, RegionHeader};
use crate::MPMC::Buffer::RingBuffer;
use crossbeam_utils::CachePadded;
use std::io;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
mod debug;
mod getters;

const MAGIC_NUMBER: u64 = 0x444D_5850_5F45_5651; // "DMXP_EVQ"
const LAYOUT_VERSION: u32 = 3;

/// The header is 128-byte aligned, so the slot band starts right after it.
const BAND_OFFSET: usize = std::mem::size_of::<RegionHeader>();

/// One named shared memory region holding exactly one queue:
/// a [`RegionHeader`] followed by the slot band of its ring buffer.
pub struct QueueRegion {
    shm: Box<dyn SharedMemoryBackend>,
    header: *mut RegionHeader,
    buffer: RingBuffer,
    name: String,
}

impl QueueRegion {
    /// Bytes a region needs for `capacity` slots of `payload_size` bytes,
    /// or `None` if that does not fit in `usize`.
    pub fn required_size(capacity: usize, payload_size: usize) -> Option<usize> {
        RingBuffer::band_size(capacity, payload_size)?.checked_add(BAND_OFFSET)
    }

    /// Create the region `name` and lay out an empty ring in it.
    ///
    /// If the name is taken by a region whose creator has exited, that region
    /// is removed and replaced. A region whose creator is still running is
    /// left alone and `AlreadyExists` is returned.
    pub fn create(name: &str, capacity: usize, payload_size: usize) -> io::Result<Self> {
        if capacity == 0 || !capacity.is_power_of_two() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Capacity must be a non-zero power of two, got {capacity}"),
            ));
        }
        let size = Self::required_size(capacity, payload_size).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{capacity} slots of {payload_size} bytes overflow the address space"),
            )
        })?;

        let shm = match SharedMemory::create_shared_memory(size, name) {
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                remove_stale(name)?;
                SharedMemory::create_shared_memory(size, name)?
            }
            other => other?,
        };

        let header = shm.as_ptr() as *mut RegionHeader;
        unsafe {
            std::ptr::write(
                header,
                RegionHeader {
                    magic: AtomicU64::new(0),
                    version: LAYOUT_VERSION,
                    creator_pid: std::process::id(),
                    channel: ChannelEntry {
                        flags: AtomicU32::new(0),
                        signal: AtomicU32::new(0),
                        capacity: capacity as u64,
                        slot_payload_size: payload_size as u64,
                        tail: CachePadded::new(AtomicU64::new(0)),
                        head: CachePadded::new(AtomicU64::new(0)),
                    },
                },
            );
        }

        let buffer = match unsafe { Self::ring(&*shm, header) } {
            Ok(buffer) => buffer,
            Err(e) => {
                let _ = SharedMemory::unlink_shared_memory(name);
                return Err(e);
            }
        };
        unsafe {
            buffer.init_slots();
            (*header).magic.store(MAGIC_NUMBER, Ordering::Release);
        }

        log::debug!("created shared memory region {name} ({size} bytes)");

        Ok(Self {
            shm,
            header,
            buffer,
            name: name.to_owned(),
        })
    }

    /// Attach to a region made by [`create`](Self::create), usually in another process.
    pub fn attach(name: &str) -> io::Result<Self> {
        let shm = SharedMemory::attach_shared_memory(name, BAND_OFFSET)?;
        let header = shm.as_ptr() as *mut RegionHeader;

        unsafe {
            if (*header).magic.load(Ordering::Acquire) != MAGIC_NUMBER {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "Invalid magic number - shared memory not properly initialized",
                ));
            }
            if (*header).version != LAYOUT_VERSION {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "Unsupported layout version {} (expected {})",
                        (*header).version,
                        LAYOUT_VERSION
                    ),
                ));
            }
        }

        let buffer = unsafe { Self::ring(&*shm, header)? };

        log::debug!("attached shared memory region {name} ({} bytes)", shm.size());

        Ok(Self {
            shm,
            header,
            buffer,
            name: name.to_owned(),
        })
    }

    /// Build the ring view, checking the header's shape against the mapping.
    ///
    /// # Safety
    /// `header` must point at the start of `shm`.
    unsafe fn ring(shm: &dyn SharedMemoryBackend, header: *mut RegionHeader) -> io::Result<RingBuffer> {
        let entry = &(*header).channel;
        let band_end = usize::try_from(entry.capacity)
            .ok()
            .zip(usize::try_from(entry.slot_payload_size).ok())
            .and_then(|(capacity, payload)| Self::required_size(capacity, payload));

        match band_end {
            Some(end) if end <= shm.size() => {}
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "Header describes {} slots of {} bytes, region is {} bytes",
                        entry.capacity,
                        entry.slot_payload_size,
                        shm.size()
                    ),
                ))
            }
        }

        RingBuffer::new(entry, shm.as_ptr().add(BAND_OFFSET)).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Capacity {} is not a power of two", entry.capacity),
            )
        })
    }

    /// The ring buffer living in this region
    pub fn buffer(&self) -> &RingBuffer {
        &self.buffer
    }
}

/// Unlink `name` if the region behind it was left by a creator that is gone.
fn remove_stale(name: &str) -> io::Result<()> {
    match SharedMemory::attach_shared_memory(name, BAND_OFFSET) {
        Ok(shm) => {
            let creator = unsafe { (*(shm.as_ptr() as *const RegionHeader)).creator_pid };
            if creator != 0 && process_alive(creator) {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("Shared memory region {name} is owned by running process {creator}"),
                ));
            }
            log::warn!("replacing shared memory region {name} left by exited process {creator}");
        }
        // Too small to hold a header: not a queue region we can reuse
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            log::warn!("replacing malformed shared memory region {name}");
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    }
    SharedMemory::unlink_shared_memory(name)
}

#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    // Signal 0 only checks for existence; EPERM still means "exists"
    let rc = unsafe { libc::kill(pid, 0) };
    rc == 0 || io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(target_os = "linux"))]
fn process_alive(_pid: u32) -> bool {
    true
}

// The raw header pointer is only dereferenced while `shm` keeps the mapping alive
unsafe impl Send for QueueRegion {}
unsafe impl Sync for QueueRegion {}
