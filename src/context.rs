use crate::deadline::Deadline;
use crate::loom::MutexGuard;

/// Which action the next wait step performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Fresh context; the spin budget hasn't been queried yet.
    InitSpinCount,
    /// Busy-wait phase, `spins_left` steps remaining.
    Spin,
    /// Spin exhausted; nothing blocking-related is held.
    WaitNone,
    /// Fallback engine only: the table entry's lock is held across
    /// the caller's condition re-check.
    WaitLocked,
    /// Indirect engine only: the entry counter was snapshotted and
    /// the next step blocks on it.
    WaitCounter,
}

/// Per-call state for one logical wait.
///
/// Stack-resident and allocation-free. Create one immediately before
/// the first wait step, feed it to every step of the same logical
/// wait, and discard it once the wait resolves. A context must never
/// be shared across threads or reused for a second wait; holding the
/// fallback lock guard makes it `!Send` by construction.
pub struct WaitContext {
    pub(crate) phase: Phase,
    pub(crate) spins_left: u32,
    pub(crate) deadline: Deadline,
    /// Generation value read before an indirect block; the comparand
    /// for the re-wait.
    pub(crate) observed_counter: u32,
    /// The entry lock, when `phase` is `WaitLocked`.
    pub(crate) held: Option<MutexGuard<'static, ()>>,
}

impl WaitContext {
    /// A fresh context for a wait bounded by `deadline`.
    pub fn new(deadline: Deadline) -> Self {
        Self {
            phase: Phase::InitSpinCount,
            spins_left: 0,
            deadline,
            observed_counter: 0,
            held: None,
        }
    }
}
