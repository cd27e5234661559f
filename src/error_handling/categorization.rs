//! Retry strategies.
//!
//! Page navigation is retried on a fixed interval; the strategies are plain
//! `tokio_retry` iterators so callers can drive them with `Retry::spawn` or
//! walk them by hand between browser commands.

use std::time::Duration;
use tokio_retry::strategy::{ExponentialBackoff, FixedInterval};

use crate::config::RetryPolicy;

/// Delays between navigation attempts.
///
/// Yields `navigation_attempts - 1` delays, so the first attempt plus one
/// attempt per delay spends exactly the configured budget.
pub fn navigation_retry_strategy(policy: &RetryPolicy) -> impl Iterator<Item = Duration> {
    FixedInterval::new(policy.navigation_interval)
        .take(policy.navigation_attempts.max(1).saturating_sub(1))
}

/// Delays between attempts of a JSON API request.
///
/// Short exponential backoff: 100ms, 200ms, capped at two retries.
pub fn api_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(50)
        .max_delay(Duration::from_secs(2))
        .take(crate::config::API_RETRY_ATTEMPTS)
}
