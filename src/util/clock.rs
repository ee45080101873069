//! Run clock: the time origin every reported offset is measured from.

use std::time::Duration;

use tokio::time::Instant;

/// Furthest point a run can schedule anything, measured from its origin.
///
/// Offsets and deadlines beyond it are clamped, so "thirty years from now"
/// stands in for "never".
pub const HORIZON: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Monotonic clock anchored at the start of a broker run.
///
/// Built on `tokio::time::Instant` so that paused-time tests observe the
/// same virtual clock the workers sleep on.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    /// Start a clock at the current instant.
    #[must_use]
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// The instant this run started.
    #[must_use]
    pub const fn origin(&self) -> Instant {
        self.origin
    }

    /// Time elapsed since the run started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    /// Absolute instant for an offset measured from the run origin,
    /// clamped to [`HORIZON`].
    #[must_use]
    pub fn at(&self, offset: Duration) -> Instant {
        self.origin + offset.min(HORIZON)
    }
}

/// Round a duration to whole seconds for user-facing text.
#[must_use]
pub fn rounded_secs(elapsed: Duration) -> u64 {
    let millis = elapsed.as_millis();
    u64::try_from((millis + 500) / 1000).unwrap_or(u64::MAX)
}

/// Milliseconds in a duration, saturating.
#[must_use]
pub fn as_millis_u64(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
