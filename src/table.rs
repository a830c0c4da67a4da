use crossbeam_utils::CachePadded;

use crate::loom::{AtomicU32, Condvar, Mutex};

#[cfg(all(not(loom), not(feature = "more-concurrency")))]
// Matches the futex-style implementations this is modelled on: with
// a max load factor of 3, 256 entries cover far more threads than
// the fallback engine is expected to serve well anyway.
const TABLE_BITS: usize = 8;
#[cfg(all(not(loom), feature = "more-concurrency"))]
// Fewer aliased addresses, at a fixed cost of ~128KiB.
const TABLE_BITS: usize = 10;
#[cfg(loom)]
// Reduce load for loom
const TABLE_BITS: usize = 1;

const TABLE_SIZE: usize = 1 << TABLE_BITS;

/// One slot of the process-wide wait table.
///
/// `counter` is bumped on every indirect notify routed through this
/// entry and is itself the word indirect waiters block on. The
/// lock + condvar pair only comes into play on hosts without a native
/// wait facility. Unrelated addresses may alias to the same entry;
/// wakeups delivered through an aliased entry surface as spurious and
/// are filtered by the caller's condition re-check.
pub(crate) struct WaitTableEntry {
    pub(crate) counter: AtomicU32,
    pub(crate) lock: Mutex<()>,
    pub(crate) condvar: Condvar,
}

impl WaitTableEntry {
    #[cfg(not(loom))]
    const fn new() -> Self {
        Self {
            counter: AtomicU32::new(0),
            lock: Mutex::new(()),
            condvar: Condvar::new(),
        }
    }

    #[cfg(loom)]
    fn new() -> Self {
        Self {
            counter: AtomicU32::new(0),
            lock: Mutex::new(()),
            condvar: Condvar::new(),
        }
    }

    /// The counter's own storage, for waiting on it directly.
    pub(crate) fn counter_addr(&self) -> *const () {
        &self.counter as *const AtomicU32 as *const ()
    }
}

#[cfg(not(loom))]
static WAIT_TABLE: [CachePadded<WaitTableEntry>; TABLE_SIZE] = {
    const INIT: CachePadded<WaitTableEntry> = CachePadded::new(WaitTableEntry::new());
    [INIT; TABLE_SIZE]
};
#[cfg(loom)]
loom::lazy_static! {
    static ref WAIT_TABLE: [CachePadded<WaitTableEntry>; TABLE_SIZE] =
        core::array::from_fn(|_| CachePadded::new(WaitTableEntry::new()));
}

/* loom tests with checkpoints can't rely on addresses, so under loom
 * entries are selected by address parity, letting tests write
 * `n as *const ()` to pick an entry.
 */
#[cfg(loom)]
fn hash(n: usize) -> usize {
    n & (TABLE_SIZE - 1)
}

#[cfg(not(loom))]
fn hash(n: usize) -> usize {
    #[cfg(target_pointer_width = "64")]
    return n.wrapping_mul(0x9E3779B97F4A7C15) >> (64 - TABLE_BITS);
    #[cfg(target_pointer_width = "32")]
    return n.wrapping_mul(0x9E3779B9) >> (32 - TABLE_BITS);
    #[cfg(not(any(target_pointer_width = "64", target_pointer_width = "32")))]
    {
        let mut h = 0;
        for i in 0..TABLE_BITS {
            h |= (n >> i) & (1 << i);
        }
        h
    }
}

/// The wait table entry serving `addr`. Pure in the address, O(1),
/// allocation-free.
pub(crate) fn entry_for(addr: *const ()) -> &'static WaitTableEntry {
    let idx = hash(addr as usize);
    debug_assert!(idx < TABLE_SIZE);
    &WAIT_TABLE[idx]
}
