//! OpenCAP directory client
//!
//! Every operation validates the alias, resolves the directory host through
//! SRV discovery and issues exactly one HTTP request. The client keeps no
//! session state; tokens returned by [`DirectoryClient::authenticate`] are
//! passed back in by the caller.

use crate::alias::validate_alias;
use crate::config::ClientConfig;
use crate::request::{DirectoryRequest, HttpTransport, Method, ReqwestTransport};
use crate::resolver::{HickorySrvLookup, ServiceResolver, SrvLookup, SrvTarget};
use crate::types::{AuthOutcome, DirectoryAddress};
use crate::Result;
use serde_json::{json, Value};
use tracing::debug;

const AUTH_PATH: &str = "/v1/auth";
const ADDRESSES_PATH: &str = "/v1/addresses";

/// OpenCAP directory client
pub struct DirectoryClient<L = HickorySrvLookup, T = ReqwestTransport> {
    resolver: ServiceResolver<L>,
    transport: T,
}

#[allow(dead_code)]
fn _assert_directory_client_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DirectoryClient>();
}

impl DirectoryClient {
    /// Client with hickory SRV discovery and a reqwest transport
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let lookup = HickorySrvLookup::new(&config.dns)?;
        let transport = ReqwestTransport::new(&config.user_agent, config.request_timeout())?;
        Ok(Self::new(lookup, transport))
    }
}

impl<L: SrvLookup, T: HttpTransport> DirectoryClient<L, T> {
    /// Client over the given lookup backend and transport
    pub fn new(lookup: L, transport: T) -> Self {
        Self {
            resolver: ServiceResolver::new(lookup),
            transport,
        }
    }

    /// Service resolver
    pub fn resolver(&self) -> &ServiceResolver<L> {
        &self.resolver
    }

    /// HTTP transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Validate `alias` and resolve its directory endpoint
    pub async fn resolve(&self, alias: &str) -> Result<SrvTarget> {
        validate_alias(alias)?;
        self.resolver.resolve_alias(alias).await
    }

    /// Request a token for `alias`
    ///
    /// A 2xx answer without a `jwt` is returned as [`AuthOutcome::Rejected`]
    /// with the raw body; transport and status failures are errors.
    pub async fn authenticate(&self, alias: &str, password: &str) -> Result<AuthOutcome> {
        let request = DirectoryRequest::new(Method::Post, AUTH_PATH).json(json!({
            "alias": alias,
            "password": password,
        }));

        let body = self.perform(alias, &request).await?;
        Ok(AuthOutcome::from_body(body))
    }

    /// Add or replace the address of `address_type`
    pub async fn put_address(
        &self,
        alias: &str,
        address_type: u32,
        address: &str,
        jwt: &str,
    ) -> Result<Value> {
        let body = serde_json::to_value(DirectoryAddress::new(address_type, address))?;
        let request = DirectoryRequest::new(Method::Put, ADDRESSES_PATH)
            .bearer(jwt)
            .json(body);

        self.perform(alias, &request).await
    }

    /// Delete the address of `address_type`
    pub async fn delete_address(&self, alias: &str, address_type: u32, jwt: &str) -> Result<Value> {
        let request =
            DirectoryRequest::new(Method::Delete, format!("{}/{}", ADDRESSES_PATH, address_type))
                .bearer(jwt);

        self.perform(alias, &request).await
    }

    /// Delete every address of `alias`
    pub async fn delete_all_addresses(&self, alias: &str, jwt: &str) -> Result<Value> {
        let request = DirectoryRequest::new(Method::Delete, ADDRESSES_PATH).bearer(jwt);

        self.perform(alias, &request).await
    }

    /// Fetch the address of `address_type`
    pub async fn get_address(&self, alias: &str, address_type: u32) -> Result<Value> {
        let request = DirectoryRequest::new(Method::Get, ADDRESSES_PATH)
            .query("alias", alias)
            .query("address_type", address_type);

        self.perform(alias, &request).await
    }

    /// Fetch every address of `alias`
    pub async fn get_addresses(&self, alias: &str) -> Result<Value> {
        let request = DirectoryRequest::new(Method::Get, ADDRESSES_PATH).query("alias", alias);

        self.perform(alias, &request).await
    }

    /// [`get_address`](Self::get_address) decoded as a [`DirectoryAddress`]
    pub async fn get_address_typed(
        &self,
        alias: &str,
        address_type: u32,
    ) -> Result<DirectoryAddress> {
        let body = self.get_address(alias, address_type).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// [`get_addresses`](Self::get_addresses) decoded as a list
    pub async fn get_addresses_typed(&self, alias: &str) -> Result<Vec<DirectoryAddress>> {
        let body = self.get_addresses(alias).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn perform(&self, alias: &str, request: &DirectoryRequest) -> Result<Value> {
        let target = self.resolve(alias).await?;
        let url = request.url(&target)?;
        debug!("Directory call {} {} for {}", request.method, request.path, target);

        self.transport.execute(url, request).await?.into_json()
    }
}
