//! Moka store implementation.

use std::mem::size_of;
use std::time::Duration;

use async_trait::async_trait;
use cachet_backend::format::{Format, JsonFormat};
use cachet_backend::{Backend, BackendResult, DeleteStatus, StoredValue};
use cachet_core::{BackendLabel, CacheKey, Raw};
use moka::future::Cache;
use tracing::trace;

use crate::builder::{MokaBackendBuilder, NoCapacity};
use crate::metrics::Capacity;

/// Encoded record together with the TTL it was written with.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Encoded record.
    pub data: Raw,
    /// Lifetime of the entry, counted from its last write.
    pub ttl: Duration,
}

impl Entry {
    /// Returns the estimated memory usage of this entry in bytes.
    pub fn memory_size(&self) -> usize {
        size_of::<Self>() + self.data.len()
    }
}

/// In-memory store powered by Moka.
///
/// Reads are lock-free, writes use fine-grained locking. Expired entries
/// are never returned, although they may occupy memory until Moka's
/// housekeeping runs.
///
/// ```
/// use cachet_moka::MokaBackend;
/// use cachet_backend::format::BincodeFormat;
///
/// let backend = MokaBackend::builder()
///     .max_entries(10_000)
///     .value_format(BincodeFormat)
///     .build();
/// ```
#[derive(Clone)]
pub struct MokaBackend<S = JsonFormat>
where
    S: Format,
{
    pub(crate) cache: Cache<CacheKey, Entry>,
    pub(crate) serializer: S,
    pub(crate) label: BackendLabel,
}

impl<S: Format> std::fmt::Debug for MokaBackend<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaBackend")
            .field("label", &self.label)
            .field("entries", &self.cache.entry_count())
            .field("serializer", &self.serializer)
            .finish()
    }
}

impl MokaBackend<JsonFormat> {
    /// Creates a builder. Capacity must be set before building.
    pub fn builder() -> MokaBackendBuilder<NoCapacity, JsonFormat> {
        MokaBackendBuilder::new()
    }
}

impl<S: Format> MokaBackend<S> {
    /// The underlying Moka cache.
    pub fn cache(&self) -> &Cache<CacheKey, Entry> {
        &self.cache
    }
}

#[async_trait]
impl<S> Backend for MokaBackend<S>
where
    S: Format,
{
    async fn get(&self, key: &CacheKey) -> BackendResult<Option<StoredValue>> {
        Ok(self
            .cache
            .get(key)
            .await
            .map(|entry| StoredValue::Bytes(entry.data)))
    }

    async fn set_ttl(&self, key: &CacheKey, value: Raw, ttl: Duration) -> BackendResult<()> {
        trace!(key = %key, ?ttl, label = %self.label, "moka insert");
        self.cache
            .insert(key.clone(), Entry { data: value, ttl })
            .await;
        Capacity {
            entries: self.cache.entry_count(),
            weighted_size: self.cache.weighted_size(),
        }
        .record(self.label.as_str());
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        match self.cache.remove(key).await {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn purge(&self) -> BackendResult<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Capacity::default().record(self.label.as_str());
        Ok(())
    }

    fn label(&self) -> BackendLabel {
        self.label.clone()
    }

    fn value_format(&self) -> &dyn Format {
        &self.serializer
    }
}
