// Shared memory backend abstraction for Linux
// Uses a named file under /dev/shm + mmap(MAP_SHARED), so unrelated processes
// can map the same region by name.

use std::fmt::Debug;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::{AsRawFd, IntoRawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;
use std::ptr::{self, NonNull};

/// A mapped shared memory region
pub trait SharedMemoryBackend: Send + Sync + Debug {
    /// Get a pointer to the mapped memory region
    fn as_ptr(&self) -> *mut u8;

    /// Get the size of the mapped region in bytes
    fn size(&self) -> usize;
}

fn shm_path(name: &str) -> io::Result<PathBuf> {
    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid shared memory name {name:?}"),
        ));
    }
    Ok(PathBuf::from("/dev/shm").join(name))
}

/// Create a new shared memory region with the specified size.
/// Fails with `AlreadyExists` if the name is taken; an existing region is
/// never reused, since other processes may still have it mapped.
///
/// # Arguments
/// * `size` - Size of the shared memory region in bytes
/// * `name` - Name of the region under /dev/shm
#[cfg(target_os = "linux")]
pub fn create_shared_memory(size: usize, name: &str) -> io::Result<Box<dyn SharedMemoryBackend>> {
    Ok(Box::new(LinuxSharedMemory::create(size, name)?))
}

/// Attach to an existing shared memory region
///
/// # Arguments
/// * `name` - Name of the shared memory region to attach to
/// * `min_size` - Smallest acceptable size of the region (for validation)
#[cfg(target_os = "linux")]
pub fn attach_shared_memory(name: &str, min_size: usize) -> io::Result<Box<dyn SharedMemoryBackend>> {
    Ok(Box::new(LinuxSharedMemory::attach(name, min_size)?))
}

/// Remove the name of a shared memory region.
/// Existing mappings stay valid until they are dropped.
pub fn unlink_shared_memory(name: &str) -> io::Result<()> {
    let path = shm_path(name)?;
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(not(target_os = "linux"))]
pub fn create_shared_memory(_size: usize, _name: &str) -> io::Result<Box<dyn SharedMemoryBackend>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "Shared memory only supported on Linux",
    ))
}

#[cfg(not(target_os = "linux"))]
pub fn attach_shared_memory(_name: &str, _min_size: usize) -> io::Result<Box<dyn SharedMemoryBackend>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "Shared memory only supported on Linux",
    ))
}

#[cfg(target_os = "linux")]
#[derive(Debug)]
pub struct LinuxSharedMemory {
    ptr: NonNull<u8>,
    size: usize,
    fd: i32,
}

#[cfg(target_os = "linux")]
unsafe impl Send for LinuxSharedMemory {}
#[cfg(target_os = "linux")]
unsafe impl Sync for LinuxSharedMemory {}

#[cfg(target_os = "linux")]
impl LinuxSharedMemory {
    /// Create a new shared memory region using /dev/shm
    pub fn create(size: usize, name: &str) -> io::Result<Self> {
        let path = shm_path(name)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(&path)
            .map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!("Failed to create shared memory file at {}: {}", path.display(), e),
                )
            })?;

        // Reserve the pages up front: a region tmpfs cannot back fails here
        // with ENOSPC instead of faulting later. The pages come back zero-filled.
        let reserved = libc::off_t::try_from(size)
            .map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))
            .and_then(|len| match unsafe { libc::posix_fallocate(file.as_raw_fd(), 0, len) } {
                0 => Ok(()),
                errno => Err(io::Error::from_raw_os_error(errno)),
            });
        if let Err(e) = reserved {
            let _ = std::fs::remove_file(&path);
            return Err(io::Error::new(
                e.kind(),
                format!("Failed to reserve {size} bytes of shared memory at {}: {e}", path.display()),
            ));
        }

        Self::map(file, size).map_err(|e| {
            let _ = std::fs::remove_file(&path);
            e
        })
    }

    /// Map an existing region created by another process (or this one).
    pub fn attach(name: &str, min_size: usize) -> io::Result<Self> {
        let path = shm_path(name)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!("Failed to open shared memory at {}: {}", path.display(), e),
                )
            })?;

        let file_size = file.metadata()?.len() as usize;
        if file_size < min_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Shared memory size too small: expected at least {} bytes, got {}",
                    min_size, file_size
                ),
            ));
        }

        Self::map(file, file_size)
    }

    fn map(file: File, size: usize) -> io::Result<Self> {
        if size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Cannot map an empty shared memory region",
            ));
        }

        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        let ptr = NonNull::new(ptr as *mut u8)
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "mmap returned a null mapping"))?;

        // Keep the file descriptor alive for the lifetime of the mapping
        Ok(Self {
            ptr,
            size,
            fd: file.into_raw_fd(),
        })
    }
}

#[cfg(target_os = "linux")]
impl Drop for LinuxSharedMemory {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.ptr.as_ptr() as *mut libc::c_void, self.size);
            libc::close(self.fd);
        }
    }
}

#[cfg(target_os = "linux")]
impl SharedMemoryBackend for LinuxSharedMemory {
    fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    fn size(&self) -> usize {
        self.size
    }
}
