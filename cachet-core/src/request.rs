//! Per-request input to the cache.
//!
//! A [`RequestView`] is the slice of an inbound request the cache cares
//! about: the raw `Cache-Control` header value and the two halves of the
//! cache key. Transports derive it once per request.
//!
//! ## Canonical fields
//!
//! When the fields that vary a response are a set of name/value pairs (a
//! query string, selected form fields) their order must not change the key.
//! [`RequestView::from_fields`] sorts the pairs by name, then value, and
//! url-encodes them:
//!
//! ```
//! use cachet_core::RequestView;
//!
//! let a = RequestView::from_fields("search", [("q", "rust"), ("page", "2")]);
//! let b = RequestView::from_fields("search", [("page", "2"), ("q", "rust")]);
//! assert_eq!(a.cache_key(), b.cache_key());
//! assert_eq!(a.cache_key().as_str(), "search:page=2&q=rust");
//! ```

use crate::CacheKey;

/// Cache-relevant view of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestView {
    /// Raw `Cache-Control` request header value, empty when absent.
    pub header_value: String,
    /// Key identifying the route.
    pub route_key: String,
    /// Canonical representation of the request fields.
    pub fields_key: String,
}

impl RequestView {
    /// Creates a view from an already canonical fields key.
    pub fn new(route_key: impl Into<String>, fields_key: impl Into<String>) -> Self {
        RequestView {
            header_value: String::new(),
            route_key: route_key.into(),
            fields_key: fields_key.into(),
        }
    }

    /// Creates a view whose fields key is the canonical encoding of `fields`.
    pub fn from_fields<I, K, V>(route_key: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(route_key, canonical_fields(fields))
    }

    /// Sets the raw `Cache-Control` header value.
    pub fn with_cache_control(mut self, header_value: impl Into<String>) -> Self {
        self.header_value = header_value.into();
        self
    }

    /// Returns `route_key + ":" + fields_key`.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(&self.route_key, &self.fields_key)
    }
}

/// Encodes name/value pairs in a stable order.
///
/// Pairs are sorted by name and then by value so repeated names keep a
/// deterministic order as well.
pub fn canonical_fields<I, K, V>(fields: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut pairs: Vec<(String, String)> = fields
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    pairs.sort();
    // Encoding `(String, String)` pairs cannot fail.
    serde_urlencoded::to_string(&pairs).unwrap_or_default()
}
