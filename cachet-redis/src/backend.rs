//! Redis store implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use cachet_backend::{
    Backend, BackendError, BackendResult, DeleteStatus, StoredValue,
    format::{BincodeFormat, Format},
};
use cachet_core::{BackendLabel, CacheKey, Raw};
use redis::{Client, aio::ConnectionManager};
use tokio::sync::OnceCell;
use tracing::trace;

use crate::error::Error;

/// Keys fetched per `SCAN` round trip while purging.
const SCAN_BATCH: usize = 100;

/// Redis-backed store.
///
/// Each record is a string key `<namespace><cache key>` written with
/// `SET .. PX`, so Redis expires it on its own.
#[derive(Clone)]
pub struct RedisBackend<S = BincodeFormat>
where
    S: Format,
{
    client: Client,
    connection: OnceCell<ConnectionManager>,
    serializer: S,
    namespace: String,
    label: BackendLabel,
}

impl<S: Format> std::fmt::Debug for RedisBackend<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("label", &self.label)
            .field("namespace", &self.namespace)
            .field("serializer", &self.serializer)
            .finish()
    }
}

impl RedisBackend<BincodeFormat> {
    /// Creates a store for `redis://127.0.0.1/` with default settings.
    pub fn new() -> Result<Self, BackendError> {
        Ok(Self::builder().build()?)
    }

    /// Creates a builder.
    #[must_use]
    pub fn builder() -> RedisBackendBuilder<BincodeFormat> {
        RedisBackendBuilder::default()
    }
}

impl<S: Format> RedisBackend<S> {
    /// Returns the shared connection manager, connecting on first use.
    pub async fn connection(&self) -> Result<&ConnectionManager, BackendError> {
        trace!("Get connection manager");
        let manager = self
            .connection
            .get_or_try_init(|| {
                trace!("Initialize new redis connection manager");
                self.client.get_connection_manager()
            })
            .await
            .map_err(Error::from)?;
        Ok(manager)
    }

    /// Prefix prepended to every key.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The Redis key a cache key is stored under.
    pub fn redis_key(&self, key: &CacheKey) -> String {
        format!("{}{}", self.namespace, key)
    }
}

/// Builder for a [`RedisBackend`].
pub struct RedisBackendBuilder<S = BincodeFormat>
where
    S: Format,
{
    connection_info: String,
    serializer: S,
    namespace: String,
    label: BackendLabel,
}

impl Default for RedisBackendBuilder<BincodeFormat> {
    fn default() -> Self {
        Self {
            connection_info: "redis://127.0.0.1/".to_owned(),
            serializer: BincodeFormat,
            namespace: "cachet:".to_owned(),
            label: BackendLabel::new_static("redis"),
        }
    }
}

impl<S: Format> RedisBackendBuilder<S> {
    /// Sets the connection URL.
    pub fn server(mut self, connection_info: impl Into<String>) -> Self {
        self.connection_info = connection_info.into();
        self
    }

    /// Sets the key prefix. Defaults to `"cachet:"`.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the record format. Defaults to [`BincodeFormat`].
    pub fn value_format<NewS: Format>(self, serializer: NewS) -> RedisBackendBuilder<NewS> {
        RedisBackendBuilder {
            connection_info: self.connection_info,
            serializer,
            namespace: self.namespace,
            label: self.label,
        }
    }

    /// Sets the label reported in logs and metrics. Defaults to `"redis"`.
    pub fn label(mut self, label: impl Into<BackendLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Parses the connection URL. Does not connect.
    pub fn build(self) -> Result<RedisBackend<S>, Error> {
        Ok(RedisBackend {
            client: Client::open(self.connection_info)?,
            connection: OnceCell::new(),
            serializer: self.serializer,
            namespace: self.namespace,
            label: self.label,
        })
    }
}

#[async_trait]
impl<S> Backend for RedisBackend<S>
where
    S: Format,
{
    async fn get(&self, key: &CacheKey) -> BackendResult<Option<StoredValue>> {
        let mut con = self.connection().await?.clone();
        let data: Option<Vec<u8>> = redis::cmd("GET")
            .arg(self.redis_key(key))
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;
        Ok(data.map(|data| StoredValue::Bytes(Bytes::from(data))))
    }

    async fn set_ttl(&self, key: &CacheKey, value: Raw, ttl: Duration) -> BackendResult<()> {
        let mut con = self.connection().await?.clone();
        // PX rejects zero.
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        redis::cmd("SET")
            .arg(self.redis_key(key))
            .arg(value.as_ref())
            .arg("PX")
            .arg(millis)
            .query_async::<()>(&mut con)
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        let mut con = self.connection().await?.clone();
        let deleted: u32 = redis::cmd("DEL")
            .arg(self.redis_key(key))
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;

        if deleted > 0 {
            Ok(DeleteStatus::Deleted(deleted))
        } else {
            Ok(DeleteStatus::Missing)
        }
    }

    async fn purge(&self) -> BackendResult<()> {
        let mut con = self.connection().await?.clone();
        let pattern = format!("{}*", self.namespace);
        let mut cursor: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut con)
                .await
                .map_err(Error::from)?;
            if !keys.is_empty() {
                trace!(count = keys.len(), "purging redis keys");
                redis::cmd("DEL")
                    .arg(&keys)
                    .query_async::<()>(&mut con)
                    .await
                    .map_err(Error::from)?;
            }
            if next == 0 {
                return Ok(());
            }
            cursor = next;
        }
    }

    fn label(&self) -> BackendLabel {
        self.label.clone()
    }

    fn value_format(&self) -> &dyn Format {
        &self.serializer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachet_backend::format::{FormatTypeId, JsonFormat};

    #[test]
    fn defaults() {
        let backend = RedisBackend::builder().build().unwrap();
        assert_eq!(backend.label().as_str(), "redis");
        assert_eq!(backend.namespace(), "cachet:");
        assert_eq!(
            backend.value_format().format_type_id(),
            FormatTypeId::Bincode
        );
    }

    #[test]
    fn keys_are_namespaced() {
        let backend = RedisBackend::builder()
            .namespace("shop:")
            .label("sessions")
            .value_format(JsonFormat)
            .build()
            .unwrap();
        let key = CacheKey::new("users", "id=1");
        assert_eq!(backend.redis_key(&key), "shop:users:id=1");
        assert_eq!(backend.label().as_str(), "sessions");
        assert_eq!(backend.value_format().format_type_id(), FormatTypeId::Json);
    }

    #[test]
    fn invalid_url_is_rejected() {
        let result = RedisBackend::builder().server("not a url").build();
        assert!(matches!(result, Err(Error::Redis(_))));
    }
}
