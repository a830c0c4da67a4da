use cfg_if::cfg_if;

cfg_if! {

if #[cfg(loom)] {
    use core::time::Duration;
    use std::sync::LockResult;

    pub(crate) use loom::sync::atomic::AtomicU32;
    pub(crate) use loom::sync::{Mutex, MutexGuard};

    /// Mirrors the subset of [`std::sync::WaitTimeoutResult`] the
    /// wait engine consumes. `std`'s type has no public constructor,
    /// so the loom build carries its own.
    pub(crate) struct WaitTimeoutResult(bool);

    impl WaitTimeoutResult {
        pub(crate) fn timed_out(&self) -> bool {
            self.0
        }
    }

    pub(crate) struct Condvar(loom::sync::Condvar);

    impl Condvar {
        pub(crate) fn new() -> Self {
            Self(loom::sync::Condvar::new())
        }

        pub(crate) fn wait<'a, T>(&self, guard: MutexGuard<'a, T>) -> LockResult<MutexGuard<'a, T>> {
            self.0.wait(guard)
        }

        /* loom doesn't model time, so a timed wait is explored as an
         * untimed one. Model tests must only use the no-deadline form,
         * otherwise an execution with no matching notify never resolves.
         */
        pub(crate) fn wait_timeout<'a, T>(
            &self,
            guard: MutexGuard<'a, T>,
            _timeout: Duration,
        ) -> LockResult<(MutexGuard<'a, T>, WaitTimeoutResult)> {
            match self.0.wait(guard) {
                Ok(guard) => Ok((guard, WaitTimeoutResult(false))),
                Err(_) => unreachable!("loom mutexes don't poison"),
            }
        }

        pub(crate) fn notify_all(&self) {
            self.0.notify_all()
        }
    }
}
else {
    pub(crate) use std::sync::atomic::AtomicU32;
    pub(crate) use std::sync::{Condvar, Mutex, MutexGuard};
}

}
