//! Directory wire types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payment address stored under an alias
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryAddress {
    /// Address type code (e.g. 100 for Bitcoin)
    pub address_type: u32,
    /// Address value, passed through verbatim
    pub address: String,
}

impl DirectoryAddress {
    /// Create an address entry
    pub fn new(address_type: u32, address: impl Into<String>) -> Self {
        Self {
            address_type,
            address: address.into(),
        }
    }
}

/// Successful authentication payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResult {
    /// Bearer token for authenticated calls
    pub jwt: String,
    /// Any other fields the server returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `/v1/auth`
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// Server issued a token
    Authenticated(AuthResult),
    /// Server answered without a token; the raw body is kept
    Rejected(Value),
}

impl AuthOutcome {
    /// Classify an auth response body
    ///
    /// Only a non-empty string `jwt` counts as a token.
    pub fn from_body(body: Value) -> Self {
        let has_jwt = body
            .get("jwt")
            .and_then(Value::as_str)
            .is_some_and(|jwt| !jwt.is_empty());
        if !has_jwt {
            return Self::Rejected(body);
        }

        match serde_json::from_value::<AuthResult>(body.clone()) {
            Ok(result) => Self::Authenticated(result),
            Err(_) => Self::Rejected(body),
        }
    }

    /// Token, if authenticated
    pub fn jwt(&self) -> Option<&str> {
        match self {
            Self::Authenticated(result) => Some(&result.jwt),
            Self::Rejected(_) => None,
        }
    }

    /// Convert into a `Result`, rejected body as the error
    pub fn into_result(self) -> std::result::Result<AuthResult, Value> {
        match self {
            Self::Authenticated(result) => Ok(result),
            Self::Rejected(body) => Err(body),
        }
    }
}
