//! Incoming HTTP request type.

use bytes::Bytes;
use http::header::AsHeaderName;
use http::{HeaderMap, HeaderValue};

/// An incoming HTTP request with its body already collected.
///
/// The router reads the body (bounded by [`MAX_BODY_BYTES`](crate::MAX_BODY_BYTES))
/// before the handler runs, so handlers see plain bytes.
pub struct Request {
    pub(crate) path: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

impl Request {
    pub(crate) fn new(path: String, headers: HeaderMap, body: Bytes) -> Self {
        Self { path, headers, body }
    }

    /// Raw URI path, still percent-encoded.
    pub fn path(&self) -> &str { &self.path }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&HeaderValue> {
        self.headers.get(name)
    }
}
