//! Error types

/// Boxed error produced by an SRV lookup backend
pub type LookupError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// OpenCAP client errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Alias does not match the alias grammar
    #[error("Invalid alias format: {0}")]
    InvalidAlias(String),

    /// SRV lookup failed
    #[error("SRV lookup for {name} failed: {source}")]
    Resolution {
        /// Queried SRV name
        name: String,
        /// Backend error, unchanged
        #[source]
        source: LookupError,
    },

    /// SRV lookup succeeded with an empty answer set
    #[error("No SRV records found for {name}")]
    NoSrvRecords {
        /// Queried SRV name
        name: String,
    },

    /// First SRV record has the root target `.`: service not offered
    #[error("Service not available at {name}")]
    ServiceUnavailable {
        /// Queried SRV name
        name: String,
    },

    /// Resolved target did not form a valid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("HTTP status {status}: {body}")]
    Status {
        /// Response status code
        status: u16,
        /// Raw response body
        body: serde_json::Value,
    },

    /// Response body could not be decoded
    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client or resolver could not be built
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for alias grammar failures, raised before any I/O
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidAlias(_))
    }

    /// True for SRV lookup failures, including empty answers
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            Self::Resolution { .. } | Self::NoSrvRecords { .. } | Self::ServiceUnavailable { .. }
        )
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::InvalidAlias("x".to_string()).is_validation());
        assert!(Error::NoSrvRecords {
            name: "_opencap._tcp.example.com".to_string()
        }
        .is_resolution());

        let err = Error::Resolution {
            name: "_opencap._tcp.example.com".to_string(),
            source: "NXDOMAIN".into(),
        };
        assert!(err.is_resolution());
        assert!(!err.is_validation());
        assert!(Error::ServiceUnavailable {
            name: "_opencap._tcp.example.com".to_string()
        }
        .is_resolution());
        assert_eq!(
            err.to_string(),
            "SRV lookup for _opencap._tcp.example.com failed: NXDOMAIN"
        );
    }

    #[test]
    fn test_resolution_keeps_source() {
        let err = Error::Resolution {
            name: "_opencap._tcp.example.com".to_string(),
            source: "NXDOMAIN".into(),
        };
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "NXDOMAIN");
    }

    #[test]
    fn test_status_display_includes_body() {
        let err = Error::Status {
            status: 401,
            body: serde_json::json!({ "message": "unauthorized" }),
        };
        assert_eq!(err.to_string(), r#"HTTP status 401: {"message":"unauthorized"}"#);
    }
}
