//! Runtime configuration for sessions and the controller.
//!
//! Only the ordering of these durations matters to the machines: the
//! keep-alive retry delay is expected to be shorter than the response
//! timeout, and the pair timeout is independent of both.

use std::time::Duration;

/// Minimum number of accepted helpers before the user is considered
/// adequately provisioned.
pub const MIN_HELPERS: usize = 3;

/// Timer durations for a single helper session.
///
/// # Example
///
/// ```
/// use helper_quorum::config::SessionConfig;
/// use std::time::Duration;
///
/// let config = SessionConfig::default()
///     .with_pair_timeout(Duration::from_secs(10))
///     .with_keep_alive_delay(Duration::from_millis(250));
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long to wait for a pairing answer before re-sending the request.
    pub pair_timeout: Duration,

    /// How long to wait for a keep-alive reply before declaring it lost.
    pub keep_alive_timeout: Duration,

    /// Pause between keep-alive rounds.
    pub keep_alive_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pair_timeout: Duration::from_secs(5),
            keep_alive_timeout: Duration::from_secs(2),
            keep_alive_delay: Duration::from_secs(1),
        }
    }
}

impl SessionConfig {
    pub fn with_pair_timeout(mut self, timeout: Duration) -> Self {
        self.pair_timeout = timeout;
        self
    }

    pub fn with_keep_alive_timeout(mut self, timeout: Duration) -> Self {
        self.keep_alive_timeout = timeout;
        self
    }

    pub fn with_keep_alive_delay(mut self, delay: Duration) -> Self {
        self.keep_alive_delay = delay;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Capacity of the controller's signal mailbox.
    pub mailbox_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 100,
        }
    }
}
