//! Request orchestration.
//!
//! [`CacheHandler::handle`] runs one request through the route cache:
//!
//! ```text
//!  bypass route ──────────────────────────────────────────► executor
//!  store read ─┬─ miss ───────────────────────────────────► executor ─► write-back
//!              ├─ failure ────────────────────────────────► executor ─► write-back
//!              └─ hit ─┬─ valid ──────────────────────────► cached
//!                      └─ invalid ─┬─ only-if-cached+stale ► stale
//!                                  └─ executor ─┬─ ok ────► fresh ─► write-back
//!                                               ├─ err+stale ► stale
//!                                               └─ err ───► error
//! ```
//!
//! Store failures never fail a request. The record handed back carries the
//! response headers to emit: `etag`, `cache-control`, and `warning` when a
//! cached record was served with one.

use std::future::Future;
use std::sync::Arc;

use cachet_backend::{BackendError, BackendResult, CacheBackend, DeleteStatus};
use cachet_core::record::{CACHE_CONTROL, ETAG, LAST_VALID_WARNING, WARNING};
use cachet_core::{CacheKey, CachedRecord, RequestView, etag};
use tracing::{debug, warn};

use crate::config::RouteCacheConfig;
use crate::directive::DirectiveSet;
use crate::error::CacheError;
use crate::executor::Executor;
use crate::metrics::{MetricsSink, NoopMetrics};
use crate::validator::is_valid;

enum Resolved {
    /// Read back from the store.
    Cached(CachedRecord),
    /// Produced by the executor during this request.
    Fresh(CachedRecord),
}

/// Serves one route from its store, refreshing through an [`Executor`].
///
/// Cloning is cheap; clones share the route configuration.
#[derive(Debug, Clone)]
pub struct CacheHandler<M = NoopMetrics> {
    config: Arc<RouteCacheConfig>,
    metrics: M,
}

impl CacheHandler<NoopMetrics> {
    /// Creates a handler that reports no metrics.
    pub fn new(config: RouteCacheConfig) -> Self {
        Self::with_metrics(config, NoopMetrics)
    }
}

impl<M: MetricsSink> CacheHandler<M> {
    /// Creates a handler that reports outcomes to `metrics`.
    pub fn with_metrics(config: RouteCacheConfig, metrics: M) -> Self {
        CacheHandler {
            config: Arc::new(config),
            metrics,
        }
    }

    /// The route configuration.
    pub fn config(&self) -> &RouteCacheConfig {
        &self.config
    }

    /// Handles `request` at the route clock's current time.
    pub async fn handle<E: Executor>(
        &self,
        request: &RequestView,
        executor: E,
    ) -> Result<CachedRecord, CacheError> {
        let now = self.config.clock().now();
        self.handle_at(now, request, executor).await
    }

    /// Handles `request` as if the current time were `now`.
    pub async fn handle_at<E: Executor>(
        &self,
        now: i64,
        request: &RequestView,
        executor: E,
    ) -> Result<CachedRecord, CacheError> {
        let key = request.cache_key();
        let route = self.config.route();

        if self.config.is_bypass() {
            debug!(route, key = %key, "caching disabled, calling executor");
            return executor
                .execute(now, &key)
                .await
                .map_err(CacheError::Executor);
        }

        let directives = DirectiveSet::parse(
            &request.header_value,
            self.config.min_age(),
            self.config.max_fresh(),
        );
        if directives.ignored.iter().any(|token| !token.is_empty()) {
            debug!(route, ignored = ?directives.ignored, "ignoring cache-control tokens");
        }

        let resolved = match self.read(&key).await {
            Ok(Some(cached)) => {
                self.revalidate(now, &key, cached, &directives, executor)
                    .await?
            }
            Ok(None) => {
                debug!(route, key = %key, "cache miss");
                self.metrics.miss(route);
                Resolved::Fresh(self.execute(now, &key, executor).await?)
            }
            Err(err) => {
                warn!(route, key = %key, error = %err, "cache read failed, calling executor");
                self.metrics.err(route);
                Resolved::Fresh(self.execute(now, &key, executor).await?)
            }
        };

        let mut record = match resolved {
            Resolved::Cached(record) => record,
            Resolved::Fresh(mut record) => {
                prepare_fresh(now, &key, &mut record);
                self.write_back(&key, &record, &directives).await;
                record
            }
        };
        self.stamp_headers(now, &mut record);
        Ok(record)
    }

    /// Removes the record `request` maps to.
    pub async fn invalidate(&self, request: &RequestView) -> Result<DeleteStatus, CacheError> {
        let key = request.cache_key();
        let status = self.bounded(self.config.store().remove(&key)).await?;
        debug!(route = self.config.route(), key = %key, ?status, "invalidated");
        Ok(status)
    }

    /// Removes every record in the route's store.
    pub async fn purge(&self) -> Result<(), CacheError> {
        self.bounded(self.config.store().purge()).await?;
        debug!(route = self.config.route(), "purged");
        Ok(())
    }

    async fn revalidate<E: Executor>(
        &self,
        now: i64,
        key: &CacheKey,
        mut cached: CachedRecord,
        directives: &DirectiveSet,
        executor: E,
    ) -> Result<Resolved, CacheError> {
        let route = self.config.route();
        let age = cached.age(now);
        cached.from_cache = true;

        let reason = match is_valid(age, self.config.max_age(), &directives.chain()) {
            Ok(()) => {
                debug!(route, key = %key, age, "cache hit");
                self.metrics.hit(route);
                cached.warning = directives.warning();
                return Ok(Resolved::Cached(cached));
            }
            Err(reason) => reason,
        };

        let allow_stale = self.config.allow_stale();
        if directives.force_cache_only && allow_stale {
            debug!(route, key = %key, age, %reason, "only-if-cached, serving stale record");
            return Ok(Resolved::Cached(self.serve_stale(cached)));
        }

        match executor.execute(now, key).await {
            Ok(fresh) => {
                debug!(route, key = %key, age, %reason, "cached record rejected, refreshed");
                self.metrics.evict(route, reason, age);
                Ok(Resolved::Fresh(fresh))
            }
            Err(err) if allow_stale => {
                warn!(route, key = %key, error = %err, "refresh failed, serving stale record");
                Ok(Resolved::Cached(self.serve_stale(cached)))
            }
            Err(err) => {
                debug!(route, key = %key, age, %reason, "cached record rejected, refresh failed");
                self.metrics.evict(route, reason, age);
                Err(CacheError::Executor(err))
            }
        }
    }

    fn serve_stale(&self, mut cached: CachedRecord) -> CachedRecord {
        self.metrics.hit(self.config.route());
        cached.warning = LAST_VALID_WARNING.to_owned();
        cached
    }

    async fn execute<E: Executor>(
        &self,
        now: i64,
        key: &CacheKey,
        executor: E,
    ) -> Result<CachedRecord, CacheError> {
        executor
            .execute(now, key)
            .await
            .map_err(CacheError::Executor)
    }

    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CachedRecord>> {
        self.bounded(self.config.store().read_record(key)).await
    }

    async fn write_back(&self, key: &CacheKey, record: &CachedRecord, directives: &DirectiveSet) {
        let route = self.config.route();
        if directives.no_store {
            debug!(route, key = %key, "no-store, skipping write-back");
            return;
        }
        if !record.is_success() {
            debug!(route, key = %key, status = record.status, "not caching unsuccessful response");
            return;
        }
        let write = self
            .config
            .store()
            .write_record(key, record, self.config.ttl());
        match self.bounded(write).await {
            Ok(()) => self.metrics.add(route),
            Err(err) => {
                warn!(route, key = %key, error = %err, "cache write failed");
                self.metrics.err(route);
            }
        }
    }

    async fn bounded<T>(&self, call: impl Future<Output = BackendResult<T>>) -> BackendResult<T> {
        match self.config.store_timeout() {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| Err(BackendError::Timeout(limit))),
            None => call.await,
        }
    }

    fn stamp_headers(&self, now: i64, record: &mut CachedRecord) {
        let remaining = self.config.max_age().saturating_sub(record.age(now).max(0));
        let cache_control = if remaining < 0 {
            "must-revalidate".to_owned()
        } else {
            format!("max-age={remaining}")
        };
        let etag = record.etag.clone();
        record.set_header(ETAG, etag);
        record.set_header(CACHE_CONTROL, cache_control);
        if record.from_cache && !record.warning.is_empty() {
            let warning = record.warning.clone();
            record.set_header(WARNING, warning);
        } else {
            record.remove_header(WARNING);
        }
    }
}

/// Executor output is always stamped with the evaluation time.
fn prepare_fresh(now: i64, key: &CacheKey, record: &mut CachedRecord) {
    record.from_cache = false;
    record.last_valid_at = now;
    record.warning.clear();
    if record.etag.is_empty() {
        record.etag = etag::generate(key.as_bytes(), now);
    }
}
