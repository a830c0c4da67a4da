use core::hint;

use crate::capability::{self, CapabilityLevel};
use crate::context::{Phase, WaitContext};
use crate::native;

#[cfg(loom)]
fn spin_budget(_is_direct: bool) -> u32 {
    // Keep loom executions short; spinning adds nothing to the model.
    0
}

#[cfg(not(loom))]
fn spin_budget(is_direct: bool) -> u32 {
    use core::sync::atomic::{AtomicU32, Ordering::Relaxed};

    const UNKNOWN: u32 = u32::MAX;
    static PARALLELISM: AtomicU32 = AtomicU32::new(UNKNOWN);

    let mut cpus = PARALLELISM.load(Relaxed);
    if cpus == UNKNOWN {
        cpus = std::thread::available_parallelism().map_or(1, |n| n.get() as u32);
        PARALLELISM.store(cpus, Relaxed);
    }
    // A single hardware thread can't make progress while this one
    // spins, go straight to blocking.
    if cpus < 2 {
        return 0;
    }
    if is_direct {
        4000
    } else {
        // Indirect wakeups need a notifier to bump the generation
        // counter first, which takes longer than a plain store; a
        // short spin is enough to catch the fast case.
        500
    }
}

/// One step of the bounded busy-wait run before blocking.
///
/// Returns true if a spin was consumed and the caller should re-check
/// its condition, false once the budget is exhausted (or the phase
/// already moved past spinning) and the engine should block.
pub(crate) fn spin_step(cx: &mut WaitContext, is_direct: bool) -> bool {
    if is_direct && native::SPINS_INTERNALLY && capability::probe() == CapabilityLevel::NativeWait {
        // The native primitive spins before blocking on its own;
        // spinning here as well would double up. Only direct waits
        // benefit from that internal spin, an indirect wait needs a
        // notify to change the counter.
        return false;
    }
    loop {
        match cx.phase {
            Phase::InitSpinCount => {
                cx.spins_left = spin_budget(is_direct);
                cx.phase = Phase::Spin;
            }
            Phase::Spin => {
                return if cx.spins_left > 0 {
                    cx.spins_left -= 1;
                    hint::spin_loop();
                    true
                } else {
                    cx.phase = Phase::WaitNone;
                    false
                };
            }
            _ => return false,
        }
    }
}
