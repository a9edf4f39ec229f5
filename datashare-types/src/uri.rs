//! Resource URI parsing and normalization.
//!
//! A resource URI names a provider (authority) and a dataset within it
//! (path), optionally carrying query parameters:
//!
//! ```text
//! datashare://com.example.provider/entry/DB00/TBL00?Proxy=true
//! datashare:///com.example.provider/entry/DB00/TBL00
//! datashareproxy://com.example.provider/test
//! ```
//!
//! The second form (empty authority component) addresses the provider by
//! the first path segment; both forms resolve to the same authority.
//!
//! The normalized form is canonical: lowercased scheme and authority with
//! the query component stripped. Normalization is idempotent.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scheme used by proxy-addressed resources.
const PROXY_SCHEME: &str = "datashareproxy";

/// Query parameter that switches a URI into proxy addressing.
const PROXY_PARAM: &str = "proxy";

/// A parsed resource URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUri {
    raw: String,
    scheme: String,
    authority: String,
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl ResourceUri {
    /// Parses a resource URI from a string.
    ///
    /// Empty input, a missing scheme, or a URI with neither authority nor
    /// path is rejected with [`Error::InvalidUri`].
    pub fn parse(input: &str) -> crate::Result<Self> {
        if input.is_empty() {
            return Err(Error::InvalidUri("empty URI".into()));
        }

        let Some((scheme, rest)) = input.split_once("://") else {
            return Err(Error::InvalidUri(format!("missing scheme: {input}")));
        };
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '.') {
            return Err(Error::InvalidUri(format!("bad scheme: {input}")));
        }

        let (body, query_str) = match rest.split_once('?') {
            Some((b, q)) => (b, Some(q)),
            None => (rest, None),
        };

        let (authority, path) = match body.split_once('/') {
            Some((a, p)) => (a.to_string(), p),
            None => (body.to_string(), ""),
        };

        // Collapse duplicate slashes; empty segments carry no meaning.
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if authority.is_empty() && segments.is_empty() {
            return Err(Error::InvalidUri(format!("no authority or path: {input}")));
        }

        let query = query_str
            .map(|q| {
                q.split('&')
                    .filter(|p| !p.is_empty())
                    .map(|pair| match pair.split_once('=') {
                        Some((k, v)) => (k.to_string(), v.to_string()),
                        None => (pair.to_string(), String::new()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            raw: input.to_string(),
            scheme: scheme.to_string(),
            authority,
            segments,
            query,
        })
    }

    /// Returns the URI scheme.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the provider identity this URI addresses.
    ///
    /// When the authority component is empty (`scheme:///bundle/...`), the
    /// first path segment is the authority.
    #[must_use]
    pub fn authority(&self) -> &str {
        if self.authority.is_empty() {
            self.segments.first().map(String::as_str).unwrap_or("")
        } else {
            &self.authority
        }
    }

    /// Returns the path component, leading slash included.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Returns the path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the last path segment, if any. Providers conventionally use
    /// this as the table name.
    #[must_use]
    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Returns all query parameters in document order.
    #[must_use]
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// Returns the first value for a query parameter, matched
    /// case-insensitively on the key.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true when this URI requests proxy addressing, either via the
    /// `datashareproxy` scheme or a `Proxy=true` query parameter.
    #[must_use]
    pub fn is_proxy(&self) -> bool {
        if self.scheme.eq_ignore_ascii_case(PROXY_SCHEME) {
            return true;
        }
        self.query_param(PROXY_PARAM)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Returns the canonical form of this URI: lowercased scheme and
    /// authority, collapsed path, query stripped.
    ///
    /// Normalization is idempotent: parsing the normalized form and
    /// normalizing again yields the same string.
    #[must_use]
    pub fn normalized(&self) -> String {
        let mut out = String::with_capacity(self.raw.len());
        out.push_str(&self.scheme.to_ascii_lowercase());
        out.push_str("://");
        out.push_str(&self.authority.to_ascii_lowercase());
        for seg in &self.segments {
            out.push('/');
            out.push_str(seg);
        }
        out
    }

    /// Returns the original text this URI was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for ResourceUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
