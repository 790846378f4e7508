//! The cached response envelope.
//!
//! A [`CachedRecord`] is what the executor produces on a fresh computation
//! and what a store holds between requests. It carries the response
//! payload, a snapshot of the response headers, and the bookkeeping needed
//! to judge freshness:
//!
//! - `last_valid_at` - when the payload was computed (Unix seconds)
//! - `etag` - fingerprint of the key and computation time
//! - `warning` - advisory text surfaced through the `Warning` header
//! - `from_cache` - whether this value was read back from a store
//!
//! Records are written once per key per refresh cycle and overwritten
//! wholesale by the next refresh.

use std::collections::BTreeMap;
use std::mem::size_of;

use serde::{Deserialize, Serialize};

use crate::Raw;

/// Header name for the entity tag.
pub const ETAG: &str = "etag";
/// Header name for cache directives.
pub const CACHE_CONTROL: &str = "cache-control";
/// Header name for cache warnings.
pub const WARNING: &str = "warning";

/// Warning attached to a stale record served in place of a fresh one.
pub const LAST_VALID_WARNING: &str = "last-valid";

const fn default_status() -> u16 {
    200
}

/// A cached response.
///
/// Header names in the snapshot are stored lowercase; [`set_header`] and
/// [`header`] normalise for you.
///
/// [`set_header`]: CachedRecord::set_header
/// [`header`]: CachedRecord::header
///
/// # Example
///
/// ```
/// use cachet_core::CachedRecord;
///
/// let record = CachedRecord::new("hello")
///     .with_header("Content-Type", "text/plain")
///     .with_status(200);
///
/// assert_eq!(record.header("content-type"), Some("text/plain"));
/// assert!(!record.from_cache);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedRecord {
    /// Response body bytes.
    pub payload: Raw,
    /// Snapshot of the response headers, keyed by lowercase name.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Response status code.
    #[serde(default = "default_status")]
    pub status: u16,
    /// When the payload was computed, in Unix seconds.
    pub last_valid_at: i64,
    /// Entity tag of the payload.
    #[serde(default)]
    pub etag: String,
    /// Advisory warning text, empty when there is none.
    #[serde(default)]
    pub warning: String,
    /// Whether the record was served from a store.
    #[serde(default)]
    pub from_cache: bool,
}

impl CachedRecord {
    /// Creates a fresh `200` record with the given payload and no headers.
    pub fn new(payload: impl Into<Raw>) -> Self {
        CachedRecord {
            payload: payload.into(),
            headers: BTreeMap::new(),
            status: default_status(),
            last_valid_at: 0,
            etag: String::new(),
            warning: String::new(),
            from_cache: false,
        }
    }

    /// Sets the status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Adds a header to the snapshot.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Sets the computation time.
    pub fn with_last_valid_at(mut self, last_valid_at: i64) -> Self {
        self.last_valid_at = last_valid_at;
        self
    }

    /// Inserts or replaces a header in the snapshot.
    pub fn set_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Removes a header from the snapshot, returning its value.
    pub fn remove_header(&mut self, name: impl AsRef<str>) -> Option<String> {
        self.headers.remove(&name.as_ref().to_ascii_lowercase())
    }

    /// Looks up a header by case-insensitive name.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(&name.as_ref().to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Seconds elapsed between the computation time and `now`.
    ///
    /// Negative when the record claims to come from the future. Saturates
    /// instead of overflowing on nonsensical stored timestamps.
    #[inline]
    pub fn age(&self, now: i64) -> i64 {
        now.saturating_sub(self.last_valid_at)
    }

    /// Whether the status code is a 2xx success.
    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the estimated memory usage of this record in bytes.
    pub fn memory_size(&self) -> usize {
        let headers: usize = self.headers.iter().map(|(k, v)| k.len() + v.len()).sum();
        size_of::<Self>() + self.payload.len() + headers + self.etag.len() + self.warning.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_are_case_insensitive() {
        let mut record = CachedRecord::new("x").with_header("ETag", "1-1");
        assert_eq!(record.header("etag"), Some("1-1"));
        assert_eq!(record.header("ETAG"), Some("1-1"));

        record.set_header("etag", "2-2");
        assert_eq!(record.headers.len(), 1);
        assert_eq!(record.remove_header("Etag"), Some("2-2".to_owned()));
        assert!(record.headers.is_empty());
    }

    #[test]
    fn age_is_relative_to_last_valid_at() {
        let record = CachedRecord::new("x").with_last_valid_at(1);
        assert_eq!(record.age(9), 8);
        assert_eq!(record.age(0), -1);
    }

    #[test]
    fn success_range() {
        assert!(CachedRecord::new("").is_success());
        assert!(CachedRecord::new("").with_status(204).is_success());
        assert!(!CachedRecord::new("").with_status(304).is_success());
        assert!(!CachedRecord::new("").with_status(500).is_success());
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let record: CachedRecord =
            serde_json::from_str(r#"{"payload":[104,105],"last_valid_at":3}"#).unwrap();
        assert_eq!(record.payload.as_ref(), b"hi");
        assert_eq!(record.status, 200);
        assert!(record.headers.is_empty());
        assert!(record.etag.is_empty());
        assert!(!record.from_cache);
    }
}
