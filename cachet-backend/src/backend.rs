use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use cachet_core::{BackendLabel, CacheKey, CachedRecord, Raw};

use crate::{
    BackendError, DeleteStatus, StoredValue,
    format::{Format, JsonFormat},
    metrics::{self, Op, Timer},
};

pub type BackendResult<T> = Result<T, BackendError>;

/// A key-value store with per-key TTL.
///
/// Implementations must be safe for concurrent use: the cache calls them
/// from every request task at once, with no coordination between requests
/// for the same key.
#[async_trait]
pub trait Backend: Sync + Send {
    /// Reads the value stored under `key`.
    async fn get(&self, key: &CacheKey) -> BackendResult<Option<StoredValue>>;

    /// Stores `value` under `key`, expiring it after `ttl`.
    async fn set_ttl(&self, key: &CacheKey, value: Raw, ttl: Duration) -> BackendResult<()>;

    /// Removes the value stored under `key`.
    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus>;

    /// Removes every value this store owns.
    async fn purge(&self) -> BackendResult<()>;

    /// Returns the label of this store for logs and metrics.
    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("backend")
    }

    /// Returns the format records are encoded with.
    fn value_format(&self) -> &dyn Format {
        &JsonFormat
    }
}

#[async_trait]
impl Backend for &dyn Backend {
    async fn get(&self, key: &CacheKey) -> BackendResult<Option<StoredValue>> {
        (*self).get(key).await
    }

    async fn set_ttl(&self, key: &CacheKey, value: Raw, ttl: Duration) -> BackendResult<()> {
        (*self).set_ttl(key, value, ttl).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (*self).remove(key).await
    }

    async fn purge(&self) -> BackendResult<()> {
        (*self).purge().await
    }

    fn label(&self) -> BackendLabel {
        (*self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (*self).value_format()
    }
}

#[async_trait]
impl Backend for Box<dyn Backend> {
    async fn get(&self, key: &CacheKey) -> BackendResult<Option<StoredValue>> {
        (**self).get(key).await
    }

    async fn set_ttl(&self, key: &CacheKey, value: Raw, ttl: Duration) -> BackendResult<()> {
        (**self).set_ttl(key, value, ttl).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    async fn purge(&self) -> BackendResult<()> {
        (**self).purge().await
    }

    fn label(&self) -> BackendLabel {
        (**self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (**self).value_format()
    }
}

#[async_trait]
impl Backend for Arc<dyn Backend + Send + 'static> {
    async fn get(&self, key: &CacheKey) -> BackendResult<Option<StoredValue>> {
        (**self).get(key).await
    }

    async fn set_ttl(&self, key: &CacheKey, value: Raw, ttl: Duration) -> BackendResult<()> {
        (**self).set_ttl(key, value, ttl).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    async fn purge(&self) -> BackendResult<()> {
        (**self).purge().await
    }

    fn label(&self) -> BackendLabel {
        (**self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (**self).value_format()
    }
}

/// Record-level operations on top of a [`Backend`].
///
/// `read_record` and `write_record` handle encoding through the store's
/// [`value_format`](Backend::value_format) and record per-store metrics.
/// Decode failures come back as [`BackendError::FormatError`] so callers
/// can treat a corrupt record like any other read failure.
#[async_trait]
pub trait CacheBackend: Backend {
    /// Reads and decodes the record stored under `key`.
    #[tracing::instrument(skip(self), level = "trace", fields(backend = %self.label()))]
    async fn read_record(&self, key: &CacheKey) -> BackendResult<Option<CachedRecord>> {
        let label = self.label();
        let timer = Timer::new();
        let value = self
            .get(key)
            .await
            .inspect_err(|_| metrics::record_error(Op::Read, label.as_str()))?;
        let bytes_read = value.as_ref().map_or(0, StoredValue::len);
        metrics::record_op(Op::Read, label.as_str(), timer.elapsed(), bytes_read);

        let Some(value) = value else {
            return Ok(None);
        };

        let timer = Timer::new();
        let record = self
            .value_format()
            .decode_stored(&value)
            .inspect_err(|error| {
                tracing::debug!(%error, "stored record does not decode");
                metrics::record_error(Op::Read, label.as_str());
            })?;
        metrics::record_codec(Op::Read, label.as_str(), timer.elapsed());
        Ok(Some(record))
    }

    /// Encodes `record` and stores it under `key` for `ttl`.
    #[tracing::instrument(skip(self, record), level = "trace", fields(backend = %self.label()))]
    async fn write_record(
        &self,
        key: &CacheKey,
        record: &CachedRecord,
        ttl: Duration,
    ) -> BackendResult<()> {
        let label = self.label();
        let timer = Timer::new();
        let encoded = self
            .value_format()
            .encode(record)
            .inspect_err(|error| {
                tracing::debug!(%error, "record does not encode");
                metrics::record_error(Op::Write, label.as_str());
            })?;
        metrics::record_codec(Op::Write, label.as_str(), timer.elapsed());

        let bytes_written = encoded.len();
        let timer = Timer::new();
        self.set_ttl(key, encoded, ttl)
            .await
            .inspect_err(|_| metrics::record_error(Op::Write, label.as_str()))?;
        metrics::record_op(Op::Write, label.as_str(), timer.elapsed(), bytes_written);
        tracing::trace!(bytes = bytes_written, "record stored");
        Ok(())
    }
}

impl<B: Backend + ?Sized> CacheBackend for B {}
