//! Poll timing for the reconciliation loop.
//!
//! The worker has exactly two delays:
//!
//! - **Poll interval**: 1 second after a clean cycle (with or without a
//!   transition). Configure via `CRITICAL_MASS_POLL_INTERVAL_MS`.
//! - **Failure delay**: 20 seconds after any cycle that failed to fetch or
//!   apply. Configure via `CRITICAL_MASS_FAILURE_DELAY_SECS`.
//!
//! There is no exponential backoff or jitter; the two-tier delay is the whole
//! backpressure policy.

use std::time::Duration;

/// Default delay after a clean cycle (1 second).
const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Default delay after a failed cycle (20 seconds).
const DEFAULT_FAILURE_DELAY_SECS: u64 = 20;

/// Configuration for the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay after a clean cycle.
    ///
    /// Default: 1 second. Configure via `CRITICAL_MASS_POLL_INTERVAL_MS`.
    pub poll_interval: Duration,

    /// Delay after a cycle that failed to fetch or apply.
    ///
    /// Default: 20 seconds. Configure via `CRITICAL_MASS_FAILURE_DELAY_SECS`.
    pub failure_delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PollConfig {
    /// Creates a new `PollConfig` with default values.
    pub fn new() -> Self {
        PollConfig {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            failure_delay: Duration::from_secs(DEFAULT_FAILURE_DELAY_SECS),
        }
    }

    /// Creates a `PollConfig` from environment variables.
    ///
    /// Unset, unparseable or zero values use defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a `PollConfig` through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let poll_ms = lookup("CRITICAL_MASS_POLL_INTERVAL_MS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);

        let failure_secs = lookup("CRITICAL_MASS_FAILURE_DELAY_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_FAILURE_DELAY_SECS);

        PollConfig {
            poll_interval: Duration::from_millis(poll_ms),
            failure_delay: Duration::from_secs(failure_secs),
        }
    }

    /// The delay before the next cycle.
    pub fn delay_after(&self, cycle_failed: bool) -> Duration {
        if cycle_failed {
            self.failure_delay
        } else {
            self.poll_interval
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = PollConfig::new();

        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.failure_delay, Duration::from_secs(20));
    }

    #[test]
    fn failed_cycles_wait_longer() {
        let config = PollConfig::new();

        assert_eq!(config.delay_after(false), config.poll_interval);
        assert_eq!(config.delay_after(true), config.failure_delay);
    }

    #[test]
    fn lookup_overrides_both_delays() {
        let config = PollConfig::from_lookup(|key| match key {
            "CRITICAL_MASS_POLL_INTERVAL_MS" => Some("250".to_string()),
            "CRITICAL_MASS_FAILURE_DELAY_SECS" => Some("90".to_string()),
            _ => None,
        });

        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.failure_delay, Duration::from_secs(90));
    }

    #[test]
    fn zero_delays_fall_back_to_defaults() {
        let config = PollConfig::from_lookup(|key| match key {
            "CRITICAL_MASS_POLL_INTERVAL_MS" | "CRITICAL_MASS_FAILURE_DELAY_SECS" => {
                Some("0".to_string())
            }
            _ => None,
        });

        assert_eq!(config, PollConfig::new());
        assert!(config.delay_after(true) > Duration::ZERO);
        assert!(config.delay_after(false) > Duration::ZERO);
    }

    #[test]
    fn unparseable_values_use_defaults() {
        let config = PollConfig::from_lookup(|_| Some("often".to_string()));

        assert_eq!(config, PollConfig::new());
    }
}
