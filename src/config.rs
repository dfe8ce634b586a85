// MIT License - Copyright (c) 2026 insteon-hub-bridge authors

use std::time::Duration;

/// Configuration for connecting to an Insteon hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Hub IP address or hostname
    pub host: String,
    /// Hub TCP port (default: 9761, the hub's raw PLM port)
    pub port: u16,
    /// Delay between reconnection attempts (default: 30s)
    pub retry_interval: Duration,
    /// Interval between full device status polls (default: 60s)
    pub poll_interval: Duration,
    /// Capacity of the state-update broadcast channel handed out by
    /// `subscribe()` (default: 64)
    pub update_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: "192.168.0.100".to_string(),
            port: 9761,
            retry_interval: Duration::from_secs(30),
            poll_interval: Duration::from_secs(60),
            update_capacity: 64,
        }
    }
}

impl HubConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> HubConfigBuilder {
        HubConfigBuilder::default()
    }
}

/// Builder for HubConfig.
#[derive(Debug, Clone, Default)]
pub struct HubConfigBuilder {
    config: HubConfig,
}

impl HubConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.config.retry_interval = interval;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn update_capacity(mut self, capacity: usize) -> Self {
        self.config.update_capacity = capacity;
        self
    }

    pub fn build(self) -> HubConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = HubConfig::builder()
            .host("10.0.0.5")
            .port(9763)
            .retry_interval(Duration::from_secs(5))
            .build();
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, 9763);
        assert_eq!(config.retry_interval, Duration::from_secs(5));
        // untouched fields keep their defaults
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.update_capacity, 64);
    }
}
