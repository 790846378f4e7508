//! Tests for record-level store operations.

mod common;

use std::sync::Arc;
use std::time::Duration;

use cachet_backend::{
    Backend, BackendError, BincodeFormat, CacheBackend, DeleteStatus, Format, JsonFormat,
    StoredValue,
};
use cachet_core::{CacheKey, CachedRecord};
use common::TestBackend;
use pretty_assertions::assert_eq;

fn record() -> CachedRecord {
    let mut record = CachedRecord::new("payload")
        .with_header("content-type", "text/plain")
        .with_last_valid_at(42);
    record.etag = "1-42".to_owned();
    record
}

#[tokio::test]
async fn write_then_read_record() {
    let backend = TestBackend::new();
    let key = CacheKey::new("route", "a=1");

    backend
        .write_record(&key, &record(), Duration::from_secs(10))
        .await
        .unwrap();

    assert_eq!(backend.ttl_of(&key), Some(Duration::from_secs(10)));
    assert_eq!(backend.read_record(&key).await.unwrap(), Some(record()));
}

#[tokio::test]
async fn missing_key_reads_none() {
    let backend = TestBackend::new();
    let key = CacheKey::new("route", "");
    assert_eq!(backend.read_record(&key).await.unwrap(), None);
}

#[tokio::test]
async fn corrupt_record_is_a_decode_error() {
    let backend = TestBackend::new();
    let key = CacheKey::new("route", "");
    backend.put_raw(&key, StoredValue::Text("{not json".to_owned()));

    let err = backend.read_record(&key).await.unwrap_err();
    assert!(err.is_decode(), "unexpected error: {err:?}");
    assert!(matches!(err, BackendError::FormatError(_)));
}

#[tokio::test]
async fn string_values_from_the_store_decode() {
    let backend = TestBackend::new();
    let key = CacheKey::new("route", "");
    let encoded = JsonFormat.encode(&record()).unwrap();
    let text = String::from_utf8(encoded.to_vec()).unwrap();
    backend.put_raw(&key, StoredValue::Text(text));

    assert_eq!(backend.read_record(&key).await.unwrap(), Some(record()));
}

#[tokio::test]
async fn store_format_is_used_for_both_directions() {
    let backend = TestBackend::with_format(BincodeFormat);
    let key = CacheKey::new("route", "");
    backend
        .write_record(&key, &record(), Duration::from_secs(1))
        .await
        .unwrap();

    let raw = backend.get(&key).await.unwrap().unwrap();
    assert!(JsonFormat.decode(raw.as_bytes()).is_err());
    assert_eq!(backend.read_record(&key).await.unwrap(), Some(record()));
}

#[tokio::test]
async fn trait_objects_delegate() {
    let backend: Arc<dyn Backend + Send> = Arc::new(TestBackend::new());
    let key = CacheKey::new("route", "");
    backend
        .write_record(&key, &record(), Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(backend.label().as_str(), "test");
    assert_eq!(backend.remove(&key).await.unwrap(), DeleteStatus::Deleted(1));
    assert_eq!(backend.remove(&key).await.unwrap(), DeleteStatus::Missing);
    backend.purge().await.unwrap();
}
