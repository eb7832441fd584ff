//! Gateway builder implementation
//!
//! Provides a builder pattern for creating and configuring the HTTP gateway.

use std::collections::HashMap;
use std::time::Duration;

use super::HttpGateway;
use crate::config::ConnectConfig;

/// Default user agent string
const DEFAULT_USER_AGENT: &str = concat!("connect-reports-rs/", env!("CARGO_PKG_VERSION"));

/// Builder for the HTTP gateway
#[derive(Debug, Clone)]
pub struct GatewayBuilder {
    /// Request timeout
    timeout: Option<Duration>,

    /// User agent
    user_agent: String,

    /// Custom headers to include with all requests
    custom_headers: HashMap<String, String>,
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            custom_headers: HashMap::new(),
        }
    }
}

impl GatewayBuilder {
    /// Create a new gateway builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded from the shared configuration
    pub fn from_config(config: &ConnectConfig) -> Self {
        let mut builder = Self::new();
        builder.timeout = config.timeout();
        builder
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a header sent with every request
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(key.into(), value.into());
        self
    }

    /// Build the gateway
    pub fn build(self) -> HttpGateway {
        HttpGateway {
            timeout: self.timeout,
            user_agent: self.user_agent,
            default_headers: self.custom_headers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = GatewayBuilder::new();
        assert!(builder.timeout.is_none());
        assert!(builder.user_agent.starts_with("connect-reports-rs/"));
    }

    #[test]
    fn test_builder_from_config() {
        let mut config = ConnectConfig::new("issuer", "kid", "/tmp/key.p8");
        config.timeout_seconds = Some(7);

        let builder = GatewayBuilder::from_config(&config).header("X-Trace", "1");
        assert_eq!(builder.timeout, Some(Duration::from_secs(7)));
        assert_eq!(builder.custom_headers.get("X-Trace").map(String::as_str), Some("1"));
    }
}
