//! The `wait.rs` scenarios with the capability pinned to the
//! lock + condvar engine, in its own binary: the pin is process-wide
//! and permanent, so it can't share a process with the native runs.
//! Same interleavings, same expected outcomes.

#![cfg(not(loom))]

mod common;

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering::SeqCst};
use std::thread;
use std::time::{Duration, Instant};

use atomic_wait_core::CapabilityLevel;
use common::{addr_of, wait_u32, wait_u64_indirect};

const SHORT: Duration = Duration::from_millis(50);

/// Every test pins before touching the engine, so no execution of
/// this binary can ever publish the native level.
fn pin() {
    assert_eq!(
        atomic_wait_core::set_capability(CapabilityLevel::FallbackLock),
        CapabilityLevel::FallbackLock
    );
}

#[test]
fn pin_is_permanent() {
    pin();
    assert_eq!(atomic_wait_core::capability(), CapabilityLevel::FallbackLock);
    // Asking for native afterwards changes nothing.
    assert_eq!(
        atomic_wait_core::set_capability(CapabilityLevel::NativeWait),
        CapabilityLevel::FallbackLock
    );
}

#[test]
fn direct_wait_observes_store_before_notify_all() {
    pin();
    let word = AtomicU32::new(0);
    thread::scope(|s| {
        s.spawn(|| {
            thread::sleep(SHORT);
            word.store(1, SeqCst);
            atomic_wait_core::notify_all_direct(addr_of(&word));
        });
        assert!(wait_u32(&word, 0, None));
        assert_eq!(word.load(SeqCst), 1);
    });
}

#[test]
fn notify_one_still_wakes_through_the_broadcast() {
    pin();
    let word = AtomicU32::new(0);
    thread::scope(|s| {
        s.spawn(|| {
            thread::sleep(SHORT);
            word.store(1, SeqCst);
            // Fallback notify-one is a broadcast plus re-check.
            atomic_wait_core::notify_one_direct(addr_of(&word));
        });
        assert!(wait_u32(&word, 0, None));
    });
}

#[test]
fn direct_timeout_is_bounded_below() {
    pin();
    let word = AtomicU32::new(7);
    let start = Instant::now();
    assert!(!wait_u32(&word, 7, Some(SHORT)));
    assert!(start.elapsed() >= SHORT);
    assert_eq!(word.load(SeqCst), 7);
}

#[test]
fn entry_lock_is_released_after_each_wait() {
    pin();
    // If a resolved wait leaked the entry lock, the second round's
    // notify (which pulses the same lock) would deadlock.
    let word = AtomicU32::new(0);
    for round in 1..=3u32 {
        thread::scope(|s| {
            s.spawn(|| {
                thread::sleep(Duration::from_millis(10));
                word.store(round, SeqCst);
                atomic_wait_core::notify_all_direct(addr_of(&word));
            });
            assert!(wait_u32(&word, round - 1, None));
        });
    }
}

#[test]
fn entry_lock_is_released_after_timeout() {
    pin();
    let word = AtomicU32::new(0);
    assert!(!wait_u32(&word, 0, Some(Duration::from_millis(10))));
    // A timed-out wait must leave the entry fully usable.
    thread::scope(|s| {
        s.spawn(|| {
            thread::sleep(SHORT);
            word.store(1, SeqCst);
            atomic_wait_core::notify_all_direct(addr_of(&word));
        });
        assert!(wait_u32(&word, 0, None));
    });
}

#[test]
fn indirect_wait_matches_native_outcomes() {
    pin();
    let wide = AtomicU64::new(0);
    thread::scope(|s| {
        s.spawn(|| {
            thread::sleep(SHORT);
            wide.store(u64::MAX, SeqCst);
            atomic_wait_core::notify_all_indirect(addr_of(&wide));
        });
        assert!(wait_u64_indirect(&wide, 0, None));
    });
    let start = Instant::now();
    assert!(!wait_u64_indirect(&wide, 0, Some(SHORT)));
    assert!(start.elapsed() >= SHORT);
}

#[test]
fn many_waiters_converge_under_contention() {
    pin();
    let word = AtomicU32::new(0);
    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| assert!(wait_u32(&word, 0, None)));
        }
        thread::sleep(SHORT);
        word.store(1, SeqCst);
        atomic_wait_core::notify_all_direct(addr_of(&word));
    });
}
