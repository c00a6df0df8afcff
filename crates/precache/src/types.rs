//! Request and response types passed through the worker.

use reqwest::Method;
use url::Url;

use crate::digest::sha256_hex;

/// An outgoing request intercepted by the worker.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,

    /// Absolute request URL.
    pub url: Url,

    /// Request headers forwarded to the network on a cache miss.
    pub headers: Vec<(String, String)>,

    /// Request body forwarded to the network on a cache miss.
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// A `GET` request for `url`.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// A response, either captured from the network or read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,

    /// Response headers in wire order. Values are kept as raw bytes so
    /// non-ASCII values survive capture and storage.
    pub headers: Vec<(String, Vec<u8>)>,

    /// Raw body bytes.
    pub body: Vec<u8>,

    /// Final URL the response was served from.
    pub url: String,
}

impl Response {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value matching `name` (case-insensitive), as raw bytes.
    pub fn header_bytes(&self, name: &str) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
    }

    /// First header value matching `name`, if it is valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_bytes(name).and_then(|v| std::str::from_utf8(v).ok())
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Identity used to match a request against stored entries.
///
/// Two requests match when their methods are equal and their URLs are equal
/// once the fragment is dropped. Query strings are significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    pub fn from_request(request: &Request) -> Self {
        let mut url = request.url.clone();
        url.set_fragment(None);
        Self {
            method: request.method.as_str().to_string(),
            url: url.to_string(),
        }
    }

    /// Whether entries under this key can be stored or matched.
    pub fn is_cacheable(&self) -> bool {
        self.method == Method::GET.as_str()
    }

    /// Stable hex digest naming this key's entry on disk.
    pub fn digest(&self) -> String {
        sha256_hex(format!("{} {}", self.method, self.url).as_bytes())
    }
}
