//! Configuration for the broadcast pipeline.

use std::env;
use std::time::Duration;

use outbreak_core::{MAX_MESSAGE_LENGTH, MAX_SYMPTOM_LENGTH};

use crate::error::ConfigError;

/// Default bound on a single endpoint delivery.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of undelivered events buffered per endpoint.
pub const DEFAULT_SUBSCRIPTION_CAPACITY: usize = 64;

/// Default page size for the initial report feed load.
pub const DEFAULT_FEED_LIMIT: u32 = 100;

/// Tunables for delivery, subscriptions and input limits.
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Upper bound on one endpoint delivery. A delivery that takes longer
    /// is abandoned and recorded as a delivery error.
    pub delivery_timeout: Duration,

    /// Buffer size of each subscription's channel.
    pub subscription_capacity: usize,

    /// Maximum alert message length in characters.
    pub max_message_len: usize,

    /// Maximum symptom length in characters.
    pub max_symptom_len: usize,

    /// Reports returned by the feed when the caller gives no limit.
    pub default_feed_limit: u32,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            subscription_capacity: DEFAULT_SUBSCRIPTION_CAPACITY,
            max_message_len: MAX_MESSAGE_LENGTH,
            max_symptom_len: MAX_SYMPTOM_LENGTH,
            default_feed_limit: DEFAULT_FEED_LIMIT,
        }
    }
}

impl BroadcastConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ALERT_DELIVERY_TIMEOUT_MS` | Per-delivery timeout | `5000` |
    /// | `ALERT_SUBSCRIPTION_BUFFER` | Per-endpoint event buffer | `64` |
    /// | `ALERT_FEED_LIMIT` | Default feed page size | `100` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(ms) = parse_var::<u64>("ALERT_DELIVERY_TIMEOUT_MS")? {
            if ms == 0 {
                return Err(ConfigError::Invalid {
                    var: "ALERT_DELIVERY_TIMEOUT_MS",
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.delivery_timeout = Duration::from_millis(ms);
        }

        if let Some(capacity) = parse_var::<usize>("ALERT_SUBSCRIPTION_BUFFER")? {
            if capacity == 0 {
                return Err(ConfigError::Invalid {
                    var: "ALERT_SUBSCRIPTION_BUFFER",
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.subscription_capacity = capacity;
        }

        if let Some(limit) = parse_var::<u32>("ALERT_FEED_LIMIT")? {
            config.default_feed_limit = limit;
        }

        Ok(config)
    }

    /// Set the per-delivery timeout.
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Set the per-subscription buffer size. Zero is raised to one.
    pub fn with_subscription_capacity(mut self, capacity: usize) -> Self {
        self.subscription_capacity = capacity.max(1);
        self
    }

    /// Set the default feed page size.
    pub fn with_default_feed_limit(mut self, limit: u32) -> Self {
        self.default_feed_limit = limit;
        self
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                var,
                reason: format!("could not parse {raw:?}"),
            }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = BroadcastConfig::default()
            .with_delivery_timeout(Duration::from_millis(250))
            .with_subscription_capacity(0)
            .with_default_feed_limit(20);

        assert_eq!(config.delivery_timeout, Duration::from_millis(250));
        assert_eq!(config.subscription_capacity, 1);
        assert_eq!(config.default_feed_limit, 20);
        assert_eq!(config.max_message_len, MAX_MESSAGE_LENGTH);
    }

    // Environment-based tests are combined into a single test to avoid
    // race conditions when tests run in parallel (env vars are process-global).
    #[test]
    fn test_from_env_scenarios() {
        fn clear_all_alert_vars() {
            env::remove_var("ALERT_DELIVERY_TIMEOUT_MS");
            env::remove_var("ALERT_SUBSCRIPTION_BUFFER");
            env::remove_var("ALERT_FEED_LIMIT");
        }

        // Scenario 1: defaults
        clear_all_alert_vars();
        let config = BroadcastConfig::from_env().unwrap();
        assert_eq!(config.delivery_timeout, DEFAULT_DELIVERY_TIMEOUT);
        assert_eq!(config.subscription_capacity, DEFAULT_SUBSCRIPTION_CAPACITY);
        assert_eq!(config.default_feed_limit, DEFAULT_FEED_LIMIT);

        // Scenario 2: all set
        env::set_var("ALERT_DELIVERY_TIMEOUT_MS", "1500");
        env::set_var("ALERT_SUBSCRIPTION_BUFFER", "8");
        env::set_var("ALERT_FEED_LIMIT", "25");
        let config = BroadcastConfig::from_env().unwrap();
        assert_eq!(config.delivery_timeout, Duration::from_millis(1500));
        assert_eq!(config.subscription_capacity, 8);
        assert_eq!(config.default_feed_limit, 25);

        // Scenario 3: garbage and zero are rejected
        clear_all_alert_vars();
        env::set_var("ALERT_DELIVERY_TIMEOUT_MS", "soon");
        assert!(matches!(
            BroadcastConfig::from_env(),
            Err(ConfigError::Invalid { var: "ALERT_DELIVERY_TIMEOUT_MS", .. })
        ));
        env::set_var("ALERT_DELIVERY_TIMEOUT_MS", "0");
        assert!(BroadcastConfig::from_env().is_err());

        // Cleanup
        clear_all_alert_vars();
    }
}
