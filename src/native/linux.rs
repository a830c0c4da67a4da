use core::ptr;
use core::time::Duration;

// futex doesn't spin before sleeping, the engine spins on its behalf.
pub(crate) const SPINS_INTERNALLY: bool = false;

/// futexes are 32-bit words, nothing else can be waited on directly.
pub(crate) fn supports_size(size: usize) -> bool {
    size == 4
}

fn last_errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

// Unexpected kernel failures are unrecoverable logic errors: abort in
// debug builds, treat as a timeout otherwise.
fn assume_timeout(err: i32) {
    if err != libc::ETIMEDOUT && cfg!(debug_assertions) {
        std::process::abort();
    }
}

/// Probes for futex support with a wake on a private dummy word:
/// cheap, side-effect free, and `ENOSYS` exactly when the kernel
/// lacks the facility.
pub(crate) fn detect() -> bool {
    let dummy: u32 = 0;
    let rc = unsafe {
        libc::syscall(
            libc::SYS_futex,
            &dummy as *const u32,
            libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
            1i32,
        )
    };
    rc != -1 || last_errno() != libc::ENOSYS
}

/// Blocks while the word at `addr` still holds the value behind
/// `comparand`. Returns true on a (possibly spurious) wake, false on
/// timeout.
///
/// # Safety
///
/// `addr` must be valid for a 4-byte aligned read for the duration of
/// the call, and `comparand` must point to a readable `u32`.
pub(crate) unsafe fn wait_on_address(
    addr: *const (),
    comparand: *const (),
    size: usize,
    timeout: Option<Duration>,
) -> bool {
    debug_assert!(supports_size(size));
    debug_assert!(addr as usize % 4 == 0);

    let expected = ptr::read(comparand as *const u32);
    let ts = timeout.map(|left| libc::timespec {
        tv_sec: left.as_secs() as libc::time_t,
        tv_nsec: left.subsec_nanos() as _,
    });
    let ts_ptr = ts.as_ref().map_or(ptr::null(), |ts| ts as *const libc::timespec);

    let rc = libc::syscall(
        libc::SYS_futex,
        addr,
        libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
        expected,
        ts_ptr,
    );
    if rc == 0 {
        return true;
    }
    match last_errno() {
        // The word no longer held the comparand, or a signal cut the
        // sleep short; both count as a wake the caller re-checks.
        libc::EAGAIN | libc::EINTR => true,
        err => {
            assume_timeout(err);
            false
        }
    }
}

fn futex_wake(addr: *const (), count: libc::c_int) {
    // Fire and forget; the kernel only uses `addr` as a key, so even
    // an address nobody waits on is fine.
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            addr,
            libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
            count,
        );
    }
}

pub(crate) fn wake_one(addr: *const ()) {
    futex_wake(addr, 1);
}

pub(crate) fn wake_all(addr: *const ()) {
    futex_wake(addr, libc::c_int::MAX);
}
