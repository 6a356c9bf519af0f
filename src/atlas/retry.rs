//! Backoff schedule for Atlas API requests.

use std::time::Duration;

/// How often and how patiently a failed request is repeated.
///
/// Waits grow geometrically from `initial_delay` by `multiplier` and never
/// exceed `max_delay`. Fields are public; override the defaults with
/// struct update syntax:
///
/// ```
/// use ra_dns_check::atlas::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy {
///     initial_delay: Duration::from_secs(1),
///     ..RetryPolicy::default()
/// };
/// assert_eq!(policy.backoff(2), Duration::from_secs(4));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per request, at least 1.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    /// A policy that gives up after the first failure.
    #[must_use]
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Wait before retry number `retry`, counting from 0.
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }

    /// Whether attempt number `attempt` (1-based) may be followed by another.
    #[must_use]
    pub const fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}
