use core::time::Duration;
use std::time::Instant;

/// The longest span a single underlying block call is allowed to
/// sleep. The host primitives accept bounded durations, so one
/// logical wait may be carved into several block calls, each
/// re-derived from the same absolute deadline.
pub(crate) const MAX_SINGLE_BLOCK: Duration = Duration::from_millis(864_000_000); // 10 days

/// An absolute point in time after which a wait gives up, or the
/// "never" sentinel for waits without a timeout.
///
/// Created with [`make_deadline`](crate::make_deadline) and carried
/// inside a [`WaitContext`](crate::WaitContext). All remaining-time
/// computations go through the one absolute deadline, so re-arming
/// the underlying block call introduces no cumulative drift.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    when: Option<Instant>,
}

/// Time left until a [`Deadline`], as seen by one block call.
pub(crate) enum Remaining {
    /// No deadline; block without a timeout.
    Infinite,
    /// The deadline has already passed.
    Expired,
    /// Block for at most this long, clamped to [`MAX_SINGLE_BLOCK`].
    Bounded(Duration),
}

impl Deadline {
    /// The deadline that never arrives.
    pub const NEVER: Deadline = Deadline { when: None };

    /// A deadline `timeout` from now.
    ///
    /// Timeouts far enough out to overflow the clock are treated
    /// as [`NEVER`](Self::NEVER).
    pub fn after(timeout: Duration) -> Deadline {
        Deadline {
            when: Instant::now().checked_add(timeout),
        }
    }

    /// Returns true for the no-timeout sentinel.
    pub fn is_never(&self) -> bool {
        self.when.is_none()
    }

    pub(crate) fn remaining(&self) -> Remaining {
        let when = match self.when {
            None => return Remaining::Infinite,
            Some(when) => when,
        };
        // `Expired` when already past; saturates instead of panicking.
        let left = when.saturating_duration_since(Instant::now());
        if left.is_zero() {
            Remaining::Expired
        } else if left > MAX_SINGLE_BLOCK {
            Remaining::Bounded(MAX_SINGLE_BLOCK)
        } else {
            Remaining::Bounded(left)
        }
    }
}
