use core::time::Duration;

pub(crate) const SPINS_INTERNALLY: bool = false;

pub(crate) fn supports_size(_size: usize) -> bool {
    false
}

pub(crate) fn detect() -> bool {
    false
}

/* With no native facility the capability level settles at
 * `FallbackLock` and the engine never routes here; reaching one of
 * these means the wait state is corrupted.
 */

/// # Safety
///
/// Never called; present to keep the provider surface uniform.
pub(crate) unsafe fn wait_on_address(
    _addr: *const (),
    _comparand: *const (),
    _size: usize,
    _timeout: Option<Duration>,
) -> bool {
    std::process::abort()
}

pub(crate) fn wake_one(_addr: *const ()) {
    std::process::abort()
}

pub(crate) fn wake_all(_addr: *const ()) {
    std::process::abort()
}
