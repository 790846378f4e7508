use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cachet_backend::{Backend, BackendResult, DeleteStatus, Format, JsonFormat, StoredValue};
use cachet_core::{BackendLabel, CacheKey, Raw};
use dashmap::DashMap;

/// In-memory store for testing using DashMap.
///
/// Remembers the TTL of every write so tests can assert on it.
#[derive(Clone, Debug)]
pub struct TestBackend {
    pub store: Arc<DashMap<CacheKey, (StoredValue, Duration)>>,
    pub format: Arc<dyn Format>,
}

impl TestBackend {
    pub fn new() -> Self {
        Self::with_format(JsonFormat)
    }

    pub fn with_format(format: impl Format + 'static) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            format: Arc::new(format),
        }
    }

    pub fn put_raw(&self, key: &CacheKey, value: StoredValue) {
        self.store.insert(key.clone(), (value, Duration::from_secs(60)));
    }

    pub fn ttl_of(&self, key: &CacheKey) -> Option<Duration> {
        self.store.get(key).map(|entry| entry.value().1)
    }
}

#[async_trait]
impl Backend for TestBackend {
    async fn get(&self, key: &CacheKey) -> BackendResult<Option<StoredValue>> {
        Ok(self.store.get(key).map(|entry| entry.value().0.clone()))
    }

    async fn set_ttl(&self, key: &CacheKey, value: Raw, ttl: Duration) -> BackendResult<()> {
        self.store.insert(key.clone(), (StoredValue::Bytes(value), ttl));
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        Ok(match self.store.remove(key) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    async fn purge(&self) -> BackendResult<()> {
        self.store.clear();
        Ok(())
    }

    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("test")
    }

    fn value_format(&self) -> &dyn Format {
        &self.format
    }
}
