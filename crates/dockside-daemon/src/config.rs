//! Daemon connection configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the daemon connection.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "DaemonConfig::default_timeout")]
    pub timeout_seconds: u64,

    /// Grace period the daemon waits before killing a stopping container.
    #[serde(default = "DaemonConfig::default_stop_timeout")]
    pub stop_timeout_seconds: i64,
}

impl DaemonConfig {
    const fn default_timeout() -> u64 {
        120
    }

    const fn default_stop_timeout() -> i64 {
        10
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: Self::default_timeout(),
            stop_timeout_seconds: Self::default_stop_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = DaemonConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert_eq!(config.stop_timeout_seconds, 10);
    }
}
