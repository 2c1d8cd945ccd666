// Futex helpers for the channel signal word.
// The word lives in a MAP_SHARED mapping, so the non-private futex ops are
// used: waiters and wakers may sit in different processes.

use std::sync::atomic::AtomicU32;
use std::time::Duration;

#[cfg(target_os = "linux")]
pub fn futex_wait_timeout(atomic: &AtomicU32, expected: u32, timeout: Duration) {
    use std::ptr;
    use std::sync::atomic::Ordering;

    // Check condition first to avoid syscall if possible
    if atomic.load(Ordering::Acquire) != expected || timeout.is_zero() {
        return;
    }

    // Clamp so huge timeouts stay a valid (non-negative) timespec
    let secs = timeout.as_secs().min(libc::time_t::MAX as u64);
    let ts = libc::timespec {
        tv_sec: secs as libc::time_t,
        tv_nsec: timeout.subsec_nanos() as libc::c_long,
    };

    // EAGAIN, EINTR and ETIMEDOUT all mean "go look again"
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            atomic as *const AtomicU32 as *const u32,
            libc::FUTEX_WAIT,
            expected,
            &ts as *const libc::timespec,
            ptr::null::<u32>(),
            0u32,
        );
    }
}

#[cfg(target_os = "linux")]
pub fn futex_wake(atomic: &AtomicU32, waiters: i32) {
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            atomic as *const AtomicU32 as *const u32,
            libc::FUTEX_WAKE,
            waiters,
            std::ptr::null::<libc::timespec>(),
            std::ptr::null::<u32>(),
            0u32,
        );
    }
}

#[cfg(not(target_os = "linux"))]
pub fn futex_wait_timeout(_atomic: &AtomicU32, _expected: u32, timeout: Duration) {
    // Fallback for non-Linux: short sleep, the caller re-polls
    std::thread::sleep(timeout.min(Duration::from_millis(1)));
}

#[cfg(not(target_os = "linux"))]
pub fn futex_wake(_atomic: &AtomicU32, _waiters: i32) {
    // No-op on non-Linux
}
