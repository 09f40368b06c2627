//! Client configuration

use crate::dns::DnsConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default `User-Agent` header
pub const DEFAULT_USER_AGENT: &str = concat!("opencap-client/", env!("CARGO_PKG_VERSION"));

/// OpenCAP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// DNS configuration used for SRV discovery
    pub dns: DnsConfig,
    /// `User-Agent` header sent to directory hosts
    pub user_agent: String,
    /// Per-request timeout handed to the HTTP client, in milliseconds
    pub request_timeout_ms: Option<u64>,
}

impl ClientConfig {
    /// Request timeout, if configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// With DNS configuration
    pub fn with_dns(mut self, dns: DnsConfig) -> Self {
        self.dns = dns;
        self
    }

    /// With request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            dns: DnsConfig::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_ms: None,
        }
    }
}
