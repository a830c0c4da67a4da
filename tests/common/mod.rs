//! The canonical check-then-wait loops the library's callers build on
//! top of the step functions.

#![allow(dead_code)] // each test binary uses its own subset

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering::SeqCst};
use std::time::Duration;

use atomic_wait_core::{make_deadline, WaitContext};

pub fn addr_of<T>(v: &T) -> *const () {
    v as *const T as *const ()
}

/// Waits until `word` no longer holds `expected`, through the direct
/// engine. Returns false if the timeout passed first.
pub fn wait_u32(word: &AtomicU32, expected: u32, timeout: Option<Duration>) -> bool {
    wait_u32_at(addr_of(word), word, expected, timeout)
}

/// Same, with an explicit wait address (normally `addr_of(word)`).
pub fn wait_u32_at(
    addr: *const (),
    word: &AtomicU32,
    expected: u32,
    timeout: Option<Duration>,
) -> bool {
    let mut cx = WaitContext::new(make_deadline(timeout));
    let changed = loop {
        if word.load(SeqCst) != expected {
            break true;
        }
        // SAFETY: `word` and `expected` are live for the whole call.
        let woken = unsafe {
            atomic_wait_core::wait_direct(addr, &expected as *const u32 as *const (), 4, &mut cx)
        };
        if !woken {
            break word.load(SeqCst) != expected;
        }
    };
    atomic_wait_core::unwait_direct(addr, &mut cx);
    changed
}

/// Waits until `word` no longer holds `expected`, through the
/// indirect engine (8 bytes isn't waitable on every host).
pub fn wait_u64_indirect(word: &AtomicU64, expected: u64, timeout: Option<Duration>) -> bool {
    wait_indirect_at(addr_of(word), || word.load(SeqCst) != expected, timeout)
}

/// The indirect loop with an arbitrary wait address and condition.
pub fn wait_indirect_at(
    addr: *const (),
    changed: impl Fn() -> bool,
    timeout: Option<Duration>,
) -> bool {
    let mut cx = WaitContext::new(make_deadline(timeout));
    let outcome = loop {
        if changed() {
            break true;
        }
        if !atomic_wait_core::wait_indirect(addr, &mut cx) {
            break changed();
        }
    };
    atomic_wait_core::unwait_indirect(addr, &mut cx);
    outcome
}
