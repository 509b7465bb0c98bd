use std::fmt;

use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};

use super::FetchError;

/// What the requester intends to do with the response.
/// Only `Document` (a top-level navigation) gets the offline app shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Document,
    Script,
    Style,
    Image,
    Font,
    Manifest,
    #[default]
    Other,
}

/// An intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub destination: Destination,
}

impl Request {
    pub fn new(method: Method, url: Url, destination: Destination) -> Self {
        Self {
            method,
            url,
            destination,
        }
    }

    /// A plain GET for a subresource
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url, Destination::Other)
    }

    /// A top-level navigation
    pub fn navigate(url: Url) -> Self {
        Self::new(Method::GET, url, Destination::Document)
    }

    /// Parse `url` relative to `scope`, so `./index.html` and absolute
    /// URLs are both accepted.
    pub fn resolve(scope: &Url, url: &str) -> Result<Url, FetchError> {
        scope
            .join(url)
            .map_err(|e| FetchError::InvalidRequest(format!("{}: {}", url, e)))
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    /// Hostname of the target, empty for host-less URLs
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Cache identity. The fragment never reaches the server, so it is
    /// not part of the key.
    pub fn key(&self) -> RequestKey {
        let mut url = self.url.clone();
        url.set_fragment(None);
        RequestKey {
            method: self.method.as_str().to_string(),
            url: url.to_string(),
        }
    }
}

/// Identity of a request inside a cache bucket: method + absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A fetched or cached response.
///
/// Not `Clone`: a response body is read once. Use [`Response::tee`] to get
/// two independent copies when one goes to the caller and one to the cache.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Only an exact 200 is worth caching; redirects, partial content and
    /// errors are passed through untouched.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Split into two independent copies, consuming the original.
    pub fn tee(self) -> (Self, Self) {
        let copy = self.duplicate();
        (self, copy)
    }

    /// Hand out a fresh copy of a stored response. Only storage backends
    /// call this; everything else goes through `tee`.
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}
