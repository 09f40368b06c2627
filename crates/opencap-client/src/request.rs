//! Directory requests and the HTTP transport
//!
//! Every directory call is described by a [`DirectoryRequest`] and executed by
//! an [`HttpTransport`]. The transport only moves bytes; status handling and
//! JSON decoding live in [`TransportResponse::into_json`].

use crate::resolver::SrvTarget;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// HTTP method of a directory call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// Method name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Typed description of one directory call
#[derive(Clone, PartialEq)]
pub struct DirectoryRequest {
    /// HTTP method
    pub method: Method,
    /// Path below the service root, e.g. `/v1/addresses`
    pub path: String,
    /// Query parameters, in order
    pub query: Vec<(String, String)>,
    /// Bearer token for the `Authorization` header
    pub bearer: Option<String>,
    /// JSON body
    pub body: Option<Value>,
}

impl DirectoryRequest {
    /// Request without query, auth or body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            bearer: None,
            body: None,
        }
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Attach a bearer token
    pub fn bearer(mut self, jwt: impl Into<String>) -> Self {
        self.bearer = Some(jwt.into());
        self
    }

    /// Attach a JSON body
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Full URL of this request at `target`
    pub fn url(&self, target: &SrvTarget) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", target.base_url(), self.path))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

// Bearer tokens and bodies (which carry passwords) stay out of logs.
impl fmt::Debug for DirectoryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("body", &self.body.as_ref().map(|_| "<json>"))
            .finish()
    }
}

/// Raw HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// Status code
    pub status: u16,
    /// Body bytes
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    ///
    /// Non-2xx answers become [`Error::Status`] carrying the body (as a JSON
    /// string when it is not JSON). A 2xx body decodes to JSON when it
    /// parses, to `null` when empty, and to a JSON string otherwise.
    pub fn into_json(self) -> Result<Value> {
        if !self.is_success() {
            let body = serde_json::from_slice(&self.body).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&self.body).into_owned())
            });
            return Err(Error::Status {
                status: self.status,
                body,
            });
        }

        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&self.body).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&self.body).into_owned())
        }))
    }
}

/// HTTP transport for directory calls
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` to `url` and return the raw response
    async fn execute(&self, url: Url, request: &DirectoryRequest) -> Result<TransportResponse>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    async fn execute(&self, url: Url, request: &DirectoryRequest) -> Result<TransportResponse> {
        (**self).execute(url, request).await
    }
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the given user agent and optional timeout
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("HTTP client error: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, url: Url, request: &DirectoryRequest) -> Result<TransportResponse> {
        debug!("{} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.into(), url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(jwt) = &request.bearer {
            builder = builder.bearer_auth(jwt);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        debug!("Response status {} ({} bytes)", status, body.len());

        Ok(TransportResponse::new(status, body.to_vec()))
    }
}
