//! Time abstraction for testability.
//!
//! This module provides a [`Clock`] trait that allows injecting mock clocks
//! in tests while using the real system clock in production, and a
//! [`Sleeper`] trait so retry delays can be skipped in tests.

use std::time::{Duration, SystemTime};

/// Seconds since the Unix epoch, the unit RIPE Atlas uses for timestamps.
pub type UnixTime = i64;

/// Abstraction over system time for testability.
///
/// # Example
///
/// ```
/// use ra_dns_check::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// assert!(clock.unix_now() > 0);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;

    /// Returns the current time as Unix seconds.
    fn unix_now(&self) -> UnixTime {
        to_unix(self.now())
    }
}

/// Production clock using actual system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Converts a [`SystemTime`] to Unix seconds.
///
/// Times before the epoch map to negative values.
#[must_use]
pub fn to_unix(time: SystemTime) -> UnixTime {
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
        Err(e) => -i64::try_from(e.duration().as_secs()).unwrap_or(i64::MAX),
    }
}

/// Converts a [`Duration`] to whole seconds as a signed Unix offset.
#[must_use]
pub fn duration_secs(duration: Duration) -> UnixTime {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

/// Abstraction over async sleeping, used between retry attempts.
pub trait Sleeper: Send + Sync {
    /// Sleeps for the given duration.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}

/// Production sleeper backed by [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Controllable clock and sleeper for tests.
#[cfg(test)]
pub mod mock {
    use super::{Clock, Duration, Sleeper, SystemTime};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// A mock clock that returns controlled time values.
    #[derive(Debug)]
    pub struct MockClock {
        secs: AtomicU64,
    }

    impl MockClock {
        /// Creates a clock frozen at the given Unix seconds.
        #[must_use]
        pub const fn new(initial_secs: u64) -> Self {
            Self {
                secs: AtomicU64::new(initial_secs),
            }
        }

        /// Moves the clock forward.
        pub fn advance(&self, secs: u64) {
            self.secs.fetch_add(secs, Ordering::SeqCst);
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> SystemTime {
            SystemTime::UNIX_EPOCH + Duration::from_secs(self.secs.load(Ordering::SeqCst))
        }
    }

    /// A sleeper that returns immediately and records requested delays.
    #[derive(Debug, Default)]
    pub struct InstantSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    impl InstantSleeper {
        /// Returns every delay that was requested so far.
        ///
        /// # Panics
        ///
        /// Panics if the internal lock is poisoned (only in test code).
        #[must_use]
        pub fn delays(&self) -> Vec<Duration> {
            self.delays.lock().unwrap().clone()
        }
    }

    impl Sleeper for InstantSleeper {
        async fn sleep(&self, duration: Duration) {
            self.delays.lock().unwrap().push(duration);
        }
    }
}
