use core::sync::atomic::Ordering::Relaxed;
use core::time::Duration;

use crate::capability::{self, CapabilityLevel};
use crate::context::{Phase, WaitContext};
use crate::deadline::Remaining;
use crate::native;
use crate::spin;
use crate::table;

fn use_native() -> bool {
    capability::probe() == CapabilityLevel::NativeWait
}

/// Remaining time for one block call, or `None` for "expired".
fn block_budget(cx: &WaitContext) -> Option<Option<Duration>> {
    match cx.deadline.remaining() {
        Remaining::Expired => None,
        Remaining::Infinite => Some(None),
        Remaining::Bounded(left) => Some(Some(left)),
    }
}

/// One step of the universal lock + condvar engine.
///
/// `WaitNone` takes the entry lock and hands control back so the
/// caller re-checks its condition while holding it; `WaitLocked`
/// sleeps on the condvar, which releases and reacquires the lock
/// atomically. On a wake the lock stays held (the caller re-checks,
/// then either re-enters or calls unwait); on timeout it is dropped.
fn wait_fallback(addr: *const (), cx: &mut WaitContext) -> bool {
    let left = match block_budget(cx) {
        None => return false,
        Some(left) => left,
    };
    let entry = table::entry_for(addr);
    match cx.phase {
        Phase::WaitNone => {
            /* Lock acquisition and the condvar sleep below only fail
             * on poisoning, which this crate never causes: no user
             * code runs under an entry lock.
             */
            cx.held = Some(entry.lock.lock().unwrap());
            cx.phase = Phase::WaitLocked;
            true
        }
        Phase::WaitLocked => {
            let guard = match cx.held.take() {
                Some(guard) => guard,
                // `WaitLocked` without the lock: corrupted wait state.
                None => std::process::abort(),
            };
            match left {
                None => {
                    cx.held = Some(entry.condvar.wait(guard).unwrap());
                    true
                }
                Some(left) => {
                    let (guard, result) = entry.condvar.wait_timeout(guard, left).unwrap();
                    if result.timed_out() {
                        drop(guard);
                        cx.phase = Phase::WaitNone;
                        false
                    } else {
                        cx.held = Some(guard);
                        true
                    }
                }
            }
        }
        _ => std::process::abort(),
    }
}

/// Releases whatever a partially completed fallback wait still holds.
fn unwait_fallback(cx: &mut WaitContext) {
    if cx.phase == Phase::WaitLocked {
        match cx.held.take() {
            Some(guard) => drop(guard),
            None => std::process::abort(),
        }
        cx.phase = Phase::WaitNone;
    }
}

fn notify_fallback(addr: *const ()) {
    let entry = table::entry_for(addr);
    /* The empty lock pulse establishes a happens-before edge with a
     * waiter that already re-checked its condition but hasn't reached
     * the condvar sleep yet; without it that waiter could sleep
     * through this notify.
     */
    drop(entry.lock.lock().unwrap());
    entry.condvar.notify_all();
}

pub(crate) unsafe fn wait_direct(
    addr: *const (),
    comparand: *const (),
    size: usize,
    cx: &mut WaitContext,
) -> bool {
    if spin::spin_step(cx, true) {
        return true;
    }
    if !use_native() {
        return wait_fallback(addr, cx);
    }
    debug_assert!(native::supports_size(size));
    match block_budget(cx) {
        None => false,
        // The caller upholds the read requirements on `addr` and
        // `comparand`.
        Some(left) => native::wait_on_address(addr, comparand, size, left),
    }
}

pub(crate) fn notify_one_direct(addr: *const ()) {
    if use_native() {
        native::wake_one(addr);
    } else {
        // Broadcast even for notify-one: the entry may serve several
        // aliased addresses, and the caller's value re-check filters
        // the false wins.
        notify_fallback(addr);
    }
}

pub(crate) fn notify_all_direct(addr: *const ()) {
    if use_native() {
        native::wake_all(addr);
    } else {
        notify_fallback(addr);
    }
}

pub(crate) fn unwait_direct(_addr: *const (), cx: &mut WaitContext) {
    unwait_fallback(cx);
}

/// One step of an indirect wait: block on the entry's generation
/// counter instead of the unwaitable target.
pub(crate) fn wait_indirect(addr: *const (), cx: &mut WaitContext) -> bool {
    if spin::spin_step(cx, false) {
        return true;
    }
    if !use_native() {
        return wait_fallback(addr, cx);
    }
    let entry = table::entry_for(addr);
    match cx.phase {
        Phase::WaitNone => {
            // Snapshot first, then hand back for a condition
            // re-check: a notify between the snapshot and the block
            // bumps the counter and turns the block into a no-op.
            cx.observed_counter = entry.counter.load(Relaxed);
            cx.phase = Phase::WaitCounter;
            true
        }
        Phase::WaitCounter => {
            let left = match block_budget(cx) {
                None => return false,
                Some(left) => left,
            };
            let observed = cx.observed_counter;
            /* The indirect path is the direct path applied to the
             * counter's own storage.
             *
             * SAFETY: the entry is 'static and `observed` outlives
             * the call.
             */
            let woken = unsafe {
                native::wait_on_address(
                    entry.counter_addr(),
                    &observed as *const u32 as *const (),
                    core::mem::size_of::<u32>(),
                    left,
                )
            };
            if woken {
                // Take a fresh snapshot if the caller re-waits, or a
                // stale generation would absorb the next block.
                cx.phase = Phase::WaitNone;
            }
            woken
        }
        _ => std::process::abort(),
    }
}

pub(crate) fn notify_all_indirect(addr: *const ()) {
    if !use_native() {
        notify_fallback(addr);
        return;
    }
    let entry = table::entry_for(addr);
    // Relaxed is enough: the counter only has to change bit pattern,
    // it doesn't order any other memory.
    entry.counter.fetch_add(1, Relaxed);
    native::wake_all(entry.counter_addr());
}

pub(crate) fn notify_one_indirect(addr: *const ()) {
    // Identical to notify-all on purpose: the one waiter on this
    // entry may belong to a different address aliased onto it, so
    // single-wake precision is impossible here.
    notify_all_indirect(addr);
}

pub(crate) fn unwait_indirect(_addr: *const (), cx: &mut WaitContext) {
    unwait_fallback(cx);
}
