#![deny(missing_docs)]
//! This library provides a low-level futex-like API for
//! waiting on and notifying addresses.
//!
//! # The wait table
//!
//! Atomic `wait`/`notify_one`/`notify_all` need a process-wide place
//! to block when the watched location can't be slept on directly.
//! That place is the wait table: a fixed, address-hashed array of
//! entries, each pairing a generation counter with a lock + condition
//! variable. The idea follows the Windows `WaitOnAddress` family and
//! Linux [`futexes`]: block while the word at an address still holds
//! an expected value, wake by address afterwards. Which mechanism
//! actually does the blocking is discovered once per process (see
//! [`capability()`]); when the host has no native facility every wait
//! degrades to the table's lock + condvar pairs with identical
//! observable semantics.
//!
//! Two wait shapes are provided:
//!
//! - **Direct** &mdash; block on the exact watched location. Requires
//! the location to be a size the host can wait on natively (see
//! [`is_direct_waitable`]). Done with [`wait_direct`].
//! - **Indirect** &mdash; block on the wait table entry's generation
//! counter instead, for locations the host can't wait on (wrong size,
//! or no native facility at all). Done with [`wait_indirect`].
//!
//! Both are single *steps*, not whole waits: the caller owns the
//! check-then-wait loop. Construct a [`WaitContext`], then re-check
//! the real condition before every step; a step returning `true` only
//! means "re-check", never "the value changed" (spurious wakeups are
//! legal everywhere), and `false` means the deadline passed. After a
//! wait resolves, call the matching `unwait` exactly once: on the
//! fallback engine a step can return with the table entry's lock
//! held, and `unwait` is what releases it.
//!
//! Unrelated addresses may hash to the same table entry. That only
//! ever manifests as extra spurious wakeups, which the caller's
//! re-check already has to absorb.
//!
//! # [`loom`]
//! This crate has [`loom 0.7`][`loom`] integrated, which can be
//! enabled with `--cfg loom`. DO NOT spawn real threads in loom
//! tests. loom builds always run the fallback engine, since the
//! native primitives can't be modelled, and they must only use
//! no-timeout deadlines &mdash; loom doesn't model time, so a timed
//! wait is explored as an untimed one. The loom wait table has two
//! entries selected by address parity, so tests can write
//! `n as *const ()` to pick colliding or distinct entries.
//!
//! # Features
//!
//! - `more-concurrency` - quadruples the wait table, which reduces
//! address aliasing and contention with large thread counts. Memory
//! consumption is static and in the worst case goes to ~128KiB.
//!
//! # Example
//!
//! The canonical check-then-wait loop over a 32-bit flag:
//!
//! ```rust,no_run
//! use std::sync::atomic::{AtomicU32, Ordering::SeqCst};
//! use atomic_wait_core::{make_deadline, WaitContext};
//!
//! static READY: AtomicU32 = AtomicU32::new(0);
//!
//! fn wait_until_ready() {
//!     let addr = &READY as *const AtomicU32 as *const ();
//!     let expected = 0u32;
//!     let mut cx = WaitContext::new(make_deadline(None));
//!     while READY.load(SeqCst) == expected {
//!         /* SAFETY: READY is live for the whole wait and `expected`
//!          * is a readable u32.
//!          */
//!         let woken = unsafe {
//!             atomic_wait_core::wait_direct(
//!                 addr,
//!                 &expected as *const u32 as *const (),
//!                 4,
//!                 &mut cx,
//!             )
//!         };
//!         if !woken {
//!             break; // deadline passed (not with `None` above)
//!         }
//!     }
//!     atomic_wait_core::unwait_direct(addr, &mut cx);
//! }
//!
//! fn publish_ready() {
//!     // If these lines are reordered the waiter may miss the change
//!     READY.store(1, SeqCst);
//!     atomic_wait_core::notify_all_direct(&READY as *const AtomicU32 as *const ());
//! }
//! ```
//!
//! [`futexes`]: http://man7.org/linux/man-pages/man2/futex.2.html
//! [`loom`]: https://crates.io/crates/loom/0.7.0

use core::time::Duration;

mod capability;
mod context;
mod deadline;
mod loom;
mod native;
mod spin;
mod table;
mod wait;

pub use capability::CapabilityLevel;
pub use context::WaitContext;
pub use deadline::Deadline;

/// Converts a caller-supplied timeout into an absolute [`Deadline`].
///
/// `None` maps to the no-timeout sentinel: a wait carrying it never
/// reports a timeout (though it may still wake spuriously). A finite
/// timeout becomes "now plus `timeout`"; every block call of the same
/// logical wait re-derives its remaining time from this one absolute
/// point, so re-arming introduces no drift.
pub fn make_deadline(timeout: Option<Duration>) -> Deadline {
    match timeout {
        None => Deadline::NEVER,
        Some(timeout) => Deadline::after(timeout),
    }
}

/// Whether a value of `size` bytes can be waited on with
/// [`wait_direct`] when native support is present.
///
/// Sizes failing this must go through [`wait_indirect`]. On hosts
/// whose capability settles at
/// [`FallbackLock`](CapabilityLevel::FallbackLock) the two paths
/// share one engine and the distinction stops mattering.
pub fn is_direct_waitable(size: usize) -> bool {
    native::supports_size(size)
}

/// One step of a direct wait: blocks only while the value at `addr`
/// still equals the value behind `comparand`.
///
/// Returns `true` on a wake &mdash; which may be spurious, so
/// re-check the watched value and re-enter with the same context if
/// it hasn't changed &mdash; and `false` once the context's deadline
/// passed with no wake. When the wait resolves either way, call
/// [`unwait_direct`] with the same context.
///
/// # Safety
/// - `addr` must be valid for reads of `size` bytes for the whole
/// call, and `comparand` must point to a readable value of the same
/// size.
/// - `size` must satisfy [`is_direct_waitable`] whenever the
/// capability level is [`NativeWait`](CapabilityLevel::NativeWait).
/// - Waiting on addresses that you don't own is highly discouraged:
/// unrelated users of the same address look like spurious wake-up
/// storms to each other.
#[cfg_attr(not(loom), inline)]
pub unsafe fn wait_direct(
    addr: *const (),
    comparand: *const (),
    size: usize,
    cx: &mut WaitContext,
) -> bool {
    wait::wait_direct(addr, comparand, size, cx)
}

/// Wakes one thread blocked in [`wait_direct`] on `addr`.
///
/// Call it after changing the watched value. A no-op when nobody is
/// waiting. The memory at `addr` isn't read or written and no
/// reference to it is formed, so the address may even dangle.
#[cfg_attr(not(loom), inline)]
pub fn notify_one_direct(addr: *const ()) {
    wait::notify_one_direct(addr);
}

/// Wakes every thread blocked in [`wait_direct`] on `addr`.
///
/// Call it after changing the watched value. A no-op when nobody is
/// waiting. The memory at `addr` isn't read or written and no
/// reference to it is formed, so the address may even dangle.
#[cfg_attr(not(loom), inline)]
pub fn notify_all_direct(addr: *const ()) {
    wait::notify_all_direct(addr);
}

/// Releases whatever a direct wait on `addr` still holds.
///
/// Required once per resolved wait: on the fallback engine a step can
/// return with the table entry's lock held across the caller's
/// re-check. Safe to call when nothing is held.
#[cfg_attr(not(loom), inline)]
pub fn unwait_direct(addr: *const (), cx: &mut WaitContext) {
    wait::unwait_direct(addr, cx);
}

/// One step of an indirect wait on `addr`, for values that can't be
/// waited on directly.
///
/// Blocks on the wait table entry's generation counter instead of the
/// watched location, which is never read (or otherwise touched) by
/// this function &mdash; the address only selects the entry. The
/// return contract matches [`wait_direct`]: `true` means re-check,
/// `false` means the deadline passed. Pair with [`unwait_indirect`].
#[cfg_attr(not(loom), inline)]
pub fn wait_indirect(addr: *const (), cx: &mut WaitContext) -> bool {
    wait::wait_indirect(addr, cx)
}

/// Wakes threads blocked in [`wait_indirect`] on `addr`.
///
/// Identical to [`notify_all_indirect`] by design: the entry serving
/// `addr` may also serve waiters of other addresses aliased onto it,
/// so there is no way to single out "the" waiter to wake. The value
/// re-check on the woken side filters the false wins.
#[cfg_attr(not(loom), inline)]
pub fn notify_one_indirect(addr: *const ()) {
    wait::notify_one_indirect(addr);
}

/// Wakes every thread blocked in [`wait_indirect`] on `addr`, by
/// bumping the entry's generation counter and waking its storage.
///
/// Call it after changing the watched value. A no-op when nobody is
/// waiting. The memory at `addr` isn't read or written.
#[cfg_attr(not(loom), inline)]
pub fn notify_all_indirect(addr: *const ()) {
    wait::notify_all_indirect(addr);
}

/// Releases whatever an indirect wait on `addr` still holds.
///
/// Required once per resolved wait; safe to call when nothing is
/// held. See [`unwait_direct`].
#[cfg_attr(not(loom), inline)]
pub fn unwait_indirect(addr: *const (), cx: &mut WaitContext) {
    wait::unwait_indirect(addr, cx);
}

/// The capability level this process has settled on, resolving it on
/// first call.
///
/// After resolution this is a single atomic load.
pub fn capability() -> CapabilityLevel {
    capability::probe()
}

/// Requests a capability level, for compatibility shims and tests.
///
/// Requests at or below
/// [`FallbackLock`](CapabilityLevel::FallbackLock) pin the fallback
/// engine for the rest of the process, provided native support hasn't
/// already been published &mdash; the level only ever advances, so a
/// pin that loses the race is a plain query. Requests for
/// [`NativeWait`](CapabilityLevel::NativeWait) never force anything;
/// they resolve and return the discovered level.
pub fn set_capability(requested: CapabilityLevel) -> CapabilityLevel {
    match requested {
        CapabilityLevel::NotSet | CapabilityLevel::Detecting | CapabilityLevel::FallbackLock => {
            capability::force_fallback()
        }
        CapabilityLevel::NativeWait => capability::probe(),
    }
}
