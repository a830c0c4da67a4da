use cfg_if::cfg_if;

/// The degree of native wait-on-address support discovered on this
/// host.
///
/// The process-wide level starts at [`NotSet`](Self::NotSet), passes
/// through [`Detecting`](Self::Detecting) exactly once and settles at
/// either [`FallbackLock`](Self::FallbackLock) or
/// [`NativeWait`](Self::NativeWait). It only ever advances; the one
/// exception is [`set_capability`](crate::set_capability), which may
/// pin [`FallbackLock`](Self::FallbackLock) before detection resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum CapabilityLevel {
    /// No thread has asked yet.
    NotSet = 0,
    /// One thread is running detection; everyone else spin-reads.
    Detecting = 1,
    /// No native facility; all waits go through the wait table's
    /// lock + condvar pairs.
    FallbackLock = 2,
    /// The host can block directly on an address.
    NativeWait = 3,
}

cfg_if! {

if #[cfg(loom)] {
    /* loom can't model the real native primitives, so model
     * executions always run the fallback engine.
     */
    pub(crate) fn probe() -> CapabilityLevel {
        CapabilityLevel::FallbackLock
    }

    pub(crate) fn force_fallback() -> CapabilityLevel {
        CapabilityLevel::FallbackLock
    }
}
else {
    use core::hint;
    use core::sync::atomic::AtomicU8;
    use core::sync::atomic::Ordering::{AcqRel, Acquire, Release};

    use crate::native;

    const NOT_SET: u8 = CapabilityLevel::NotSet as u8;
    const DETECTING: u8 = CapabilityLevel::Detecting as u8;
    const FALLBACK_LOCK: u8 = CapabilityLevel::FallbackLock as u8;
    const NATIVE_WAIT: u8 = CapabilityLevel::NativeWait as u8;

    static LEVEL: AtomicU8 = AtomicU8::new(NOT_SET);

    fn decode(raw: u8) -> CapabilityLevel {
        match raw {
            FALLBACK_LOCK => CapabilityLevel::FallbackLock,
            NATIVE_WAIT => CapabilityLevel::NativeWait,
            // Resolved levels are the only ones handed out.
            _ => std::process::abort(),
        }
    }

    /// Resolves (on first call) and returns the capability level.
    ///
    /// Lock-free after resolution: a plain acquire load. During
    /// resolution exactly one thread runs [`native::detect`]; racing
    /// callers spin-read until the winner publishes.
    pub(crate) fn probe() -> CapabilityLevel {
        let mut level = LEVEL.load(Acquire);
        while level == NOT_SET {
            match LEVEL.compare_exchange_weak(NOT_SET, DETECTING, Acquire, Acquire) {
                Ok(_) => {
                    let resolved = if native::detect() { NATIVE_WAIT } else { FALLBACK_LOCK };
                    // A concurrent pin may have published first; its
                    // result wins, ours is discarded.
                    return match LEVEL.compare_exchange(DETECTING, resolved, AcqRel, Acquire) {
                        Ok(_) => decode(resolved),
                        Err(published) => decode(published),
                    };
                }
                Err(observed) => level = observed,
            }
        }
        while level == DETECTING {
            hint::spin_loop();
            level = LEVEL.load(Acquire);
        }
        decode(level)
    }

    /// Pins the level to [`CapabilityLevel::FallbackLock`], unless
    /// native support was already published.
    pub(crate) fn force_fallback() -> CapabilityLevel {
        let mut level = LEVEL.load(Acquire);
        while level <= DETECTING {
            match LEVEL.compare_exchange_weak(level, FALLBACK_LOCK, Release, Acquire) {
                Ok(_) => return CapabilityLevel::FallbackLock,
                Err(observed) => level = observed,
            }
        }
        decode(level)
    }
}

}
