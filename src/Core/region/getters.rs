use super::*;

/// Read access to the region for debugging and monitoring.
impl QueueRegion {
    /// Name of the region under /dev/shm
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the mapped region in bytes
    pub fn size(&self) -> usize {
        self.shm.size()
    }

    pub fn header_ptr(&self) -> *const RegionHeader {
        self.header
    }

    /// Process id recorded by the creator.
    pub fn creator_pid(&self) -> u32 {
        // Safety: the header pointer is valid while the region exists
        unsafe { (*self.header).creator_pid }
    }

    /// True if the header carries the expected magic number.
    pub fn is_initialized(&self) -> bool {
        unsafe { (*self.header).magic.load(Ordering::Acquire) == MAGIC_NUMBER }
    }
}
