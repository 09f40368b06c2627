//! OpenCAP service discovery via DNS SRV
//!
//! The directory host for `user@example.com` is the first record of
//! `_opencap._tcp.example.com`. Records are used in the order the backend
//! returns them; priority and weight are carried but not used for selection.

use crate::alias::host_from_alias;
use crate::dns::DnsConfig;
use crate::error::LookupError;
use crate::{Error, Result};
use async_trait::async_trait;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::rr::Name;
use hickory_resolver::TokioResolver;
use std::fmt;
use tracing::debug;

/// SRV service label
pub const SRV_SERVICE: &str = "_opencap";
/// SRV protocol label
pub const SRV_PROTOCOL: &str = "_tcp";

/// SRV query name for a domain
pub fn srv_query_name(domain: &str) -> String {
    format!("{}.{}.{}", SRV_SERVICE, SRV_PROTOCOL, domain)
}

/// One SRV answer entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvRecord {
    /// Target host name
    pub target: String,
    /// Target port
    pub port: u16,
    /// Record priority
    pub priority: u16,
    /// Record weight
    pub weight: u16,
}

impl SrvRecord {
    /// Create a record
    pub fn new(target: impl Into<String>, port: u16, priority: u16, weight: u16) -> Self {
        Self {
            target: target.into(),
            port,
            priority,
            weight,
        }
    }
}

/// Resolved directory endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvTarget {
    /// Host name, without trailing root dot
    pub host: String,
    /// Port
    pub port: u16,
}

impl SrvTarget {
    /// `https://host:port` base URL
    pub fn base_url(&self) -> String {
        format!("https://{}", self)
    }
}

impl fmt::Display for SrvTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl From<&SrvRecord> for SrvTarget {
    fn from(record: &SrvRecord) -> Self {
        Self {
            host: record.target.trim_end_matches('.').to_string(),
            port: record.port,
        }
    }
}

/// SRV lookup backend
#[async_trait]
pub trait SrvLookup: Send + Sync {
    /// Look up SRV records for a fully built query name
    async fn lookup_srv(&self, name: &str) -> std::result::Result<Vec<SrvRecord>, LookupError>;
}

#[async_trait]
impl<T: SrvLookup + ?Sized> SrvLookup for std::sync::Arc<T> {
    async fn lookup_srv(&self, name: &str) -> std::result::Result<Vec<SrvRecord>, LookupError> {
        (**self).lookup_srv(name).await
    }
}

/// SRV lookups through hickory-resolver
pub struct HickorySrvLookup {
    resolver: TokioResolver,
}

impl HickorySrvLookup {
    /// Build a resolver for the configured provider
    pub fn new(config: &DnsConfig) -> Result<Self> {
        debug!("Creating SRV resolver: {}", config.provider.name());
        if let Some(resolver_config) = config.provider.resolver_config() {
            return Ok(Self::with_resolver_config(resolver_config));
        }

        let resolver = TokioResolver::builder_tokio()
            .map_err(|e| Error::Config(format!("System DNS configuration: {}", e)))?
            .build();

        Ok(Self { resolver })
    }

    /// Build a resolver from an explicit hickory configuration
    pub fn with_resolver_config(resolver_config: ResolverConfig) -> Self {
        debug!(
            "Created SRV resolver with {} nameservers",
            resolver_config.name_servers().len()
        );
        let resolver =
            TokioResolver::builder_with_config(resolver_config, TokioConnectionProvider::default())
                .build();

        Self { resolver }
    }
}

#[async_trait]
impl SrvLookup for HickorySrvLookup {
    async fn lookup_srv(&self, name: &str) -> std::result::Result<Vec<SrvRecord>, LookupError> {
        // Fully qualified, so search domains are never appended.
        let mut fqdn = Name::from_ascii(name)?;
        fqdn.set_fqdn(true);

        let lookup = self.resolver.srv_lookup(fqdn).await?;
        Ok(lookup
            .iter()
            .map(|srv| {
                SrvRecord::new(
                    srv.target().to_ascii(),
                    srv.port(),
                    srv.priority(),
                    srv.weight(),
                )
            })
            .collect())
    }
}

/// Resolves alias domains to OpenCAP endpoints
pub struct ServiceResolver<L> {
    lookup: L,
}

impl<L: SrvLookup> ServiceResolver<L> {
    /// Create a resolver over a lookup backend
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Resolve the OpenCAP endpoint of `domain`
    ///
    /// Performs exactly one SRV lookup and returns its first record. A first
    /// record targeting the root (`.`) means the domain offers no service.
    pub async fn resolve_target(&self, domain: &str) -> Result<SrvTarget> {
        let name = srv_query_name(domain);
        debug!("SRV lookup: {}", name);

        let records = self
            .lookup
            .lookup_srv(&name)
            .await
            .map_err(|source| Error::Resolution {
                name: name.clone(),
                source,
            })?;

        let first = records
            .first()
            .ok_or_else(|| Error::NoSrvRecords { name: name.clone() })?;
        let target = SrvTarget::from(first);
        if target.host.is_empty() {
            return Err(Error::ServiceUnavailable { name });
        }

        debug!("Resolved {} to {} ({} records)", name, target, records.len());

        Ok(target)
    }

    /// Resolve the OpenCAP endpoint of an alias's domain
    pub async fn resolve_alias(&self, alias: &str) -> Result<SrvTarget> {
        self.resolve_target(host_from_alias(alias)).await
    }

    /// Lookup backend
    pub fn lookup(&self) -> &L {
        &self.lookup
    }
}
