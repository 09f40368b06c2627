//! OpenCAP client
//!
//! Maps an alias (`user@domain.tld`) to its payment-address directory service.
//! The service host is discovered through the `_opencap._tcp` SRV record of the
//! alias domain; address reads and writes are JSON calls against that host.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod alias;
pub mod client;
pub mod config;
pub mod dns;
pub mod error;
pub mod request;
pub mod resolver;
pub mod types;

pub use alias::{host_from_alias, is_valid_alias, validate_alias, ALIAS_SEPARATOR};
pub use client::DirectoryClient;
pub use config::ClientConfig;
pub use dns::{DnsConfig, DnsProvider};
pub use error::{Error, Result};
pub use request::{DirectoryRequest, HttpTransport, Method, ReqwestTransport, TransportResponse};
pub use resolver::{
    srv_query_name, HickorySrvLookup, ServiceResolver, SrvLookup, SrvRecord, SrvTarget,
};
pub use types::{AuthOutcome, AuthResult, DirectoryAddress};
