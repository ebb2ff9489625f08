//! Retry and polling policy.
use std::time::Duration;

/// Timing and retry policy for the driver.
///
/// The defaults suit a hub on a local USB bus. Individual settings can be changed
/// with the `with_*` methods:
///
/// ```
/// use std::time::Duration;
/// use usb4715_hal::BridgeConfig;
///
/// let config = BridgeConfig::default()
///     .with_register_retries(5)
///     .with_transaction_timeout(Duration::from_millis(250));
/// assert_eq!(config.register_retries, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Extra attempts for a register access after a transient transfer failure.
    pub register_retries: u8,
    /// Pause before re-issuing a failed transfer.
    pub retry_delay: Duration,
    /// Timeout handed to the transport for each control transfer.
    pub control_timeout: Duration,
    /// Pause between bridge status polls.
    pub poll_interval: Duration,
    /// Maximum number of bridge status polls per transaction.
    pub max_polls: u32,
    /// Maximum time spent polling a bridge transaction.
    pub transaction_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            register_retries: 3,
            retry_delay: Duration::from_millis(2),
            control_timeout: Duration::from_millis(1000),
            poll_interval: Duration::from_millis(1),
            max_polls: 100,
            transaction_timeout: Duration::from_millis(100),
        }
    }
}

impl BridgeConfig {
    /// Set the number of retries after a transient transfer failure.
    pub fn with_register_retries(mut self, retries: u8) -> Self {
        self.register_retries = retries;
        self
    }

    /// Set the pause before re-issuing a failed transfer.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the per-transfer USB timeout.
    pub fn with_control_timeout(mut self, timeout: Duration) -> Self {
        self.control_timeout = timeout;
        self
    }

    /// Set the pause between status polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the maximum number of status polls.
    pub fn with_max_polls(mut self, polls: u32) -> Self {
        self.max_polls = polls;
        self
    }

    /// Set the maximum time spent polling.
    pub fn with_transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout = timeout;
        self
    }
}
