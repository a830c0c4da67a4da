use core::time::Duration;

use windows_sys::Win32::Foundation::{GetLastError, ERROR_TIMEOUT};
use windows_sys::Win32::System::Threading::{WaitOnAddress, WakeByAddressAll, WakeByAddressSingle};

// WaitOnAddress runs its own adaptive spin before sleeping.
pub(crate) const SPINS_INTERNALLY: bool = true;

pub(crate) fn supports_size(size: usize) -> bool {
    matches!(size, 1 | 2 | 4 | 8)
}

// Unexpected wait failures are unrecoverable logic errors: abort in
// debug builds, treat as a timeout otherwise.
fn assume_timeout(err: u32) {
    if err != ERROR_TIMEOUT && cfg!(debug_assertions) {
        std::process::abort();
    }
}

/// The address-wait family is statically linked on every target this
/// provider builds for, so detection always succeeds.
pub(crate) fn detect() -> bool {
    true
}

const INFINITE: u32 = u32::MAX;

/// Blocks while the word at `addr` still holds the value behind
/// `comparand`. Returns true on a (possibly spurious) wake, false on
/// timeout.
///
/// # Safety
///
/// `addr` and `comparand` must both be valid for reads of `size`
/// bytes for the duration of the call.
pub(crate) unsafe fn wait_on_address(
    addr: *const (),
    comparand: *const (),
    size: usize,
    timeout: Option<Duration>,
) -> bool {
    debug_assert!(supports_size(size));

    // Round sub-millisecond remainders up so the wait never ends
    // before the requested deadline.
    let millis = timeout.map_or(INFINITE, |left| {
        ((left.as_nanos() + 999_999) / 1_000_000) as u32
    });
    if WaitOnAddress(addr.cast(), comparand.cast(), size, millis) != 0 {
        true
    } else {
        assume_timeout(GetLastError());
        false
    }
}

pub(crate) fn wake_one(addr: *const ()) {
    unsafe { WakeByAddressSingle(addr.cast()) };
}

pub(crate) fn wake_all(addr: *const ()) {
    unsafe { WakeByAddressAll(addr.cast()) };
}
