//! Cache key type.
//!
//! A [`CacheKey`] identifies one cached record. It is built from a route key
//! and a canonical representation of the request fields that vary the
//! response, joined by `:`:
//!
//! ```
//! use cachet_core::CacheKey;
//!
//! let key = CacheKey::new("users.list", "page=2&sort=name");
//! assert_eq!(key.as_str(), "users.list:page=2&sort=name");
//!
//! // No fields still keeps the separator so keys stay unambiguous.
//! let key = CacheKey::new("health", "");
//! assert_eq!(format!("{}", key), "health:");
//! ```
//!
//! [`CacheKey`] uses [`SmolStr`] internally: short keys (≤23 bytes) are
//! stored inline and clones of long keys only bump a reference count.

use std::fmt;
use std::mem::size_of;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Separator between the route key and the fields key.
pub const KEY_SEPARATOR: char = ':';

/// A cache key identifying a cached record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(SmolStr);

impl CacheKey {
    /// Builds the key `route_key + ":" + fields_key`.
    pub fn new(route_key: impl AsRef<str>, fields_key: impl AsRef<str>) -> Self {
        let route_key = route_key.as_ref();
        let fields_key = fields_key.as_ref();
        let mut key = String::with_capacity(route_key.len() + fields_key.len() + 1);
        key.push_str(route_key);
        key.push(KEY_SEPARATOR);
        key.push_str(fields_key);
        CacheKey(SmolStr::from(key))
    }

    /// Wraps an already composed key without adding a separator.
    pub fn from_raw(key: impl Into<SmolStr>) -> Self {
        CacheKey(key.into())
    }

    /// Returns the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the key as bytes, as used for ETag generation and storage.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Returns the estimated memory footprint of this key in bytes.
    ///
    /// Only keys longer than the inline threshold allocate on the heap.
    pub fn memory_size(&self) -> usize {
        size_of::<Self>() + self.0.len().saturating_sub(23)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<[u8]> for CacheKey {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_route_and_fields_joined() {
        let key = CacheKey::new("search", "q=rust");
        assert_eq!(key.as_str(), "search:q=rust");
        assert_eq!(key.as_bytes(), b"search:q=rust");
    }

    #[test]
    fn raw_key_is_kept_verbatim() {
        assert_eq!(CacheKey::from_raw("a:b:c").as_str(), "a:b:c");
    }

    #[test]
    fn memory_size_counts_heap_part_of_long_keys() {
        let short = CacheKey::new("a", "b");
        assert_eq!(short.memory_size(), size_of::<CacheKey>());

        let long = CacheKey::new("a".repeat(30), "");
        assert_eq!(long.memory_size(), size_of::<CacheKey>() + 31 - 23);
    }
}
