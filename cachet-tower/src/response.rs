//! Rendering cached records as HTTP responses.

use bytes::Bytes;
use cachet::BoxError;
use cachet_core::CachedRecord;
use cachet_core::record::LAST_VALID_WARNING;
use http::{HeaderName, HeaderValue, Response, StatusCode};
use http_body_util::Full;
use tracing::debug;

/// Default header name for cache status.
pub const DEFAULT_CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache-status");

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the store.
    Hit,
    /// Computed by the wrapped service.
    Miss,
    /// Last valid record served in place of a fresh one.
    Stale,
}

impl CacheStatus {
    /// Classifies a record returned by the handler.
    pub fn of(record: &CachedRecord) -> Self {
        match (record.from_cache, record.warning == LAST_VALID_WARNING) {
            (false, _) => CacheStatus::Miss,
            (true, true) => CacheStatus::Stale,
            (true, false) => CacheStatus::Hit,
        }
    }

    /// Header value for this status.
    pub fn as_header_value(&self) -> HeaderValue {
        match self {
            CacheStatus::Hit => HeaderValue::from_static("HIT"),
            CacheStatus::Miss => HeaderValue::from_static("MISS"),
            CacheStatus::Stale => HeaderValue::from_static("STALE"),
        }
    }
}

/// Builds the response for `record`, tagging it with its cache status.
pub fn render(
    record: CachedRecord,
    status_header: &HeaderName,
) -> Result<Response<Full<Bytes>>, BoxError> {
    let cache_status = CacheStatus::of(&record);
    let mut response = Response::new(Full::new(record.payload));
    *response.status_mut() = StatusCode::from_u16(record.status)?;

    let headers = response.headers_mut();
    for (name, value) in &record.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => debug!(header = %name, "skipping header that is not valid HTTP"),
        }
    }
    headers.insert(status_header.clone(), cache_status.as_header_value());
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_record_flags() {
        let mut record = CachedRecord::new("x");
        assert_eq!(CacheStatus::of(&record), CacheStatus::Miss);

        record.from_cache = true;
        assert_eq!(CacheStatus::of(&record), CacheStatus::Hit);

        record.warning = "max-age=5".to_owned();
        assert_eq!(CacheStatus::of(&record), CacheStatus::Hit);

        record.warning = LAST_VALID_WARNING.to_owned();
        assert_eq!(CacheStatus::of(&record), CacheStatus::Stale);
    }

    #[test]
    fn renders_status_headers_and_body() {
        let record = CachedRecord::new("body")
            .with_status(203)
            .with_header("content-type", "text/plain")
            .with_header("x-broken", "line\nbreak");
        let response = render(record, &DEFAULT_CACHE_STATUS_HEADER).unwrap();

        assert_eq!(response.status(), StatusCode::NON_AUTHORITATIVE_INFORMATION);
        assert_eq!(response.headers()["content-type"], "text/plain");
        assert!(response.headers().get("x-broken").is_none());
        assert_eq!(response.headers()["x-cache-status"], "MISS");
    }

    #[test]
    fn invalid_status_is_an_error() {
        let record = CachedRecord::new("body").with_status(42);
        assert!(render(record, &DEFAULT_CACHE_STATUS_HEADER).is_err());
    }
}
