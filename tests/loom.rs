#![cfg(loom)]

use loom::sync::atomic::AtomicUsize;
use loom::thread;

use core::sync::atomic::Ordering::Relaxed;
use std::sync::Arc;

use atomic_wait_core::{make_deadline, WaitContext};

/* Addresses are passed as small integers: under loom the wait table
 * has two entries selected by address parity, so `0` and `2` share an
 * entry while `0` and `1` don't. Model tests must only use
 * no-timeout deadlines.
 */

fn wait_indirect_until(addr: usize, changed: impl Fn() -> bool) {
    let mut cx = WaitContext::new(make_deadline(None));
    while !changed() {
        if !atomic_wait_core::wait_indirect(addr as *const (), &mut cx) {
            break;
        }
    }
    atomic_wait_core::unwait_indirect(addr as *const (), &mut cx);
}

fn wait_direct_until(addr: usize, changed: impl Fn() -> bool) {
    let expected = 0u32;
    let mut cx = WaitContext::new(make_deadline(None));
    while !changed() {
        /* SAFETY: under loom every wait runs the fallback engine,
         * which treats the address as an opaque key; `expected` is a
         * readable u32 either way.
         */
        let woken = unsafe {
            atomic_wait_core::wait_direct(
                addr as *const (),
                &expected as *const u32 as *const (),
                4,
                &mut cx,
            )
        };
        if !woken {
            break;
        }
    }
    atomic_wait_core::unwait_direct(addr as *const (), &mut cx);
}

mod basic {
    use super::*;

    #[test]
    fn store_then_notify_all_is_never_missed() {
        loom::model(|| {
            let flag = Arc::new(AtomicUsize::new(0));

            let h = {
                let flag = flag.clone();
                thread::spawn(move || {
                    flag.store(1, Relaxed);
                    atomic_wait_core::notify_all_indirect(0 as *const ());
                })
            };
            wait_indirect_until(0, || flag.load(Relaxed) == 1);
            h.join().unwrap();
        });
    }

    #[test]
    fn direct_fallback_store_then_notify() {
        loom::model(|| {
            let flag = Arc::new(AtomicUsize::new(0));

            let h = {
                let flag = flag.clone();
                thread::spawn(move || {
                    flag.store(1, Relaxed);
                    atomic_wait_core::notify_all_direct(0 as *const ());
                })
            };
            wait_direct_until(0, || flag.load(Relaxed) == 1);
            h.join().unwrap();
        });
    }

    #[test]
    fn notify_one_wakes_the_lone_waiter() {
        loom::model(|| {
            let flag = Arc::new(AtomicUsize::new(0));

            let h = {
                let flag = flag.clone();
                thread::spawn(move || {
                    flag.store(1, Relaxed);
                    atomic_wait_core::notify_one_indirect(0 as *const ());
                })
            };
            wait_indirect_until(0, || flag.load(Relaxed) == 1);
            h.join().unwrap();
        });
    }
}

mod aliasing {
    use super::*;

    // Both waiters converge whether their addresses share an entry
    // (0 and 2) or not (0 and 1); a shared entry may only add
    // spurious re-checks.
    fn two_pairs(addr_a: usize, addr_b: usize) {
        let flag_a = Arc::new(AtomicUsize::new(0));
        let flag_b = Arc::new(AtomicUsize::new(0));

        let ha = {
            let flag = flag_a.clone();
            thread::spawn(move || {
                flag.store(1, Relaxed);
                atomic_wait_core::notify_all_indirect(addr_a as *const ());
            })
        };
        let hb = {
            let flag = flag_b.clone();
            thread::spawn(move || {
                wait_indirect_until(addr_b, || flag.load(Relaxed) == 1);
            })
        };

        wait_indirect_until(addr_a, || flag_a.load(Relaxed) == 1);
        flag_b.store(1, Relaxed);
        atomic_wait_core::notify_all_indirect(addr_b as *const ());

        ha.join().unwrap();
        hb.join().unwrap();
    }

    #[test]
    fn shared_entry() {
        loom::model(|| two_pairs(0, 2));
    }

    #[test]
    fn distinct_entries() {
        loom::model(|| two_pairs(0, 1));
    }
}

mod abandonment {
    use super::*;

    #[test]
    fn unwait_releases_what_a_step_took() {
        loom::model(|| {
            let flag = Arc::new(AtomicUsize::new(0));

            // A single step may acquire the entry lock; abandoning
            // the wait right after must leave the entry usable for
            // the notifier and a second waiter.
            let mut cx = WaitContext::new(make_deadline(None));
            if flag.load(Relaxed) == 0 {
                let _ = atomic_wait_core::wait_indirect(0 as *const (), &mut cx);
            }
            atomic_wait_core::unwait_indirect(0 as *const (), &mut cx);

            let h = {
                let flag = flag.clone();
                thread::spawn(move || {
                    flag.store(1, Relaxed);
                    atomic_wait_core::notify_all_indirect(0 as *const ());
                })
            };
            wait_indirect_until(0, || flag.load(Relaxed) == 1);
            h.join().unwrap();
        });
    }
}
