//! ETag generation.
//!
//! An ETag is `<crc32(key)>-<time>`: the IEEE CRC-32 of the cache key bytes
//! in decimal, a dash, and the time the record was computed. It changes
//! whenever a record is refreshed and is stable for as long as the same
//! record is served. It is a validation token, not a security primitive.

/// Generates the ETag for a record computed at `time` under `key`.
///
/// ```
/// use cachet_core::etag;
///
/// let tag = etag::generate(b"users:", 1_700_000_000);
/// assert!(tag.ends_with("-1700000000"));
/// assert_eq!(tag, etag::generate(b"users:", 1_700_000_000));
/// ```
pub fn generate(key: &[u8], time: i64) -> String {
    format!("{}-{}", crc32fast::hash(key), time)
}
