//! Alias validation and parsing
//!
//! An alias is `local-part SEP domain`. The local part follows the usual
//! e-mail grammar (dot-separated atoms or a quoted string); the domain is a
//! dotted-quad IPv4 literal (bare or bracketed) or a hostname whose top label
//! has at least two letters.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Character separating the local part from the domain
pub const ALIAS_SEPARATOR: char = '@';

static ALIAS_RE: Lazy<Regex> = Lazy::new(|| {
    let sep = regex::escape(&ALIAS_SEPARATOR.to_string());
    let atom = format!(r#"[^<>()\[\]\\.,;:\s{sep}"]+"#);
    let quad = r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}";
    let pattern = format!(
        r#"^(?:{atom}(?:\.{atom})*|".+"){sep}(?:\[{quad}\]|{quad}|(?:[a-z0-9-]+\.)+[a-z]{{2,}})$"#
    );
    Regex::new(&pattern).unwrap_or_else(|e| panic!("alias regex failed to compile: {e}"))
});

/// Check whether `alias` is a well-formed alias
pub fn is_valid_alias(alias: &str) -> bool {
    ALIAS_RE.is_match(&alias.to_lowercase())
}

/// Like [`is_valid_alias`], but as a `Result` for `?` at call sites
pub fn validate_alias(alias: &str) -> Result<()> {
    if is_valid_alias(alias) {
        Ok(())
    } else {
        Err(Error::InvalidAlias(alias.to_string()))
    }
}

/// Domain part of an alias
///
/// Returns everything after the last separator, so `"a@b"@example.com`
/// yields `example.com`. Input without a separator is returned unchanged.
pub fn host_from_alias(alias: &str) -> &str {
    alias
        .rsplit_once(ALIAS_SEPARATOR)
        .map_or(alias, |(_, domain)| domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_aliases() {
        for alias in [
            "a@b.com",
            "name@192.168.0.1",
            "name@[192.168.0.1]",
            "a@xn--a.com",
            "first.last@sub.example.org",
            "User@Example.COM",
            "\"quoted name\"@example.com",
            "satoshi+btc@pay.example.io",
        ] {
            assert!(is_valid_alias(alias), "{} should be valid", alias);
        }
    }

    #[test]
    fn test_invalid_aliases() {
        for alias in [
            "",
            "not-an-alias",
            "@example.com",
            "user@",
            "user@example",
            "user@example.c",
            "user@@example.com",
            "a@b@example.com",
            ".user@example.com",
            "user.@example.com",
            "us..er@example.com",
            "user name@example.com",
            "user@exa_mple.com",
            "user@example.com.",
            "user@example.c0m",
        ] {
            assert!(!is_valid_alias(alias), "{} should be invalid", alias);
        }
    }

    #[test]
    fn test_validate_alias_error() {
        assert!(validate_alias("user@example.com").is_ok());

        let err = validate_alias("not-an-alias").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("not-an-alias"));
    }

    #[test]
    fn test_host_from_alias() {
        assert_eq!(host_from_alias("user@example.com"), "example.com");
        assert_eq!(host_from_alias("\"a@b\"@example.com"), "example.com");
        assert_eq!(host_from_alias("a@b@c.example.com"), "c.example.com");
        assert_eq!(host_from_alias("user@"), "");
    }

    #[test]
    fn test_host_from_alias_without_separator() {
        assert_eq!(host_from_alias("example.com"), "example.com");
        assert_eq!(host_from_alias(""), "");
    }
}
