//! DNS upstream selection for SRV discovery

use hickory_resolver::config::{NameServerConfig, ResolverConfig};
use hickory_resolver::proto::xfer::Protocol;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// DNS resolver provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DnsProvider {
    /// System resolver configuration (resolv.conf or platform equivalent)
    #[default]
    System,
    /// Cloudflare (1.1.1.1)
    Cloudflare,
    /// Google (8.8.8.8)
    Google,
    /// Quad9 (9.9.9.9)
    Quad9,
    /// Explicit nameserver addresses, queried over UDP with TCP fallback
    Custom(Vec<SocketAddr>),
}

impl DnsProvider {
    /// Get provider name for display
    pub fn name(&self) -> &str {
        match self {
            Self::System => "System",
            Self::Cloudflare => "Cloudflare (1.1.1.1)",
            Self::Google => "Google (8.8.8.8)",
            Self::Quad9 => "Quad9 (9.9.9.9)",
            Self::Custom(_) => "Custom",
        }
    }

    /// Hickory resolver configuration for this provider
    ///
    /// `None` for [`DnsProvider::System`], which is read from the host instead.
    pub fn resolver_config(&self) -> Option<ResolverConfig> {
        match self {
            Self::System => None,
            Self::Cloudflare => Some(ResolverConfig::cloudflare()),
            Self::Google => Some(ResolverConfig::google()),
            Self::Quad9 => Some(ResolverConfig::quad9()),
            Self::Custom(addrs) => {
                let name_servers: Vec<NameServerConfig> = addrs
                    .iter()
                    .flat_map(|addr| {
                        [
                            NameServerConfig::new(*addr, Protocol::Udp),
                            NameServerConfig::new(*addr, Protocol::Tcp),
                        ]
                    })
                    .collect();
                Some(ResolverConfig::from_parts(None, vec![], name_servers))
            }
        }
    }
}

/// DNS configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsConfig {
    /// DNS provider
    pub provider: DnsProvider,
}

impl DnsConfig {
    /// Config for the given provider
    pub fn new(provider: DnsProvider) -> Self {
        Self { provider }
    }
}
