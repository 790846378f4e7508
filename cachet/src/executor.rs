use std::future::Future;

use cachet_core::{CacheKey, CachedRecord};

use crate::error::BoxError;

/// Computes a fresh record when the cache cannot serve one.
///
/// The executor receives the evaluation time and the cache key. It runs at
/// most once per request and is consumed by the call. Closures of the shape
/// `FnOnce(i64, CacheKey) -> impl Future<Output = Result<CachedRecord, BoxError>>`
/// implement it directly:
///
/// ```
/// use cachet::Executor;
/// use cachet_core::{CacheKey, CachedRecord};
///
/// fn assert_executor<E: Executor>(_: E) {}
///
/// assert_executor(|now: i64, _key: CacheKey| async move {
///     Ok(CachedRecord::new("computed").with_last_valid_at(now))
/// });
/// ```
pub trait Executor {
    /// Future returned by [`execute`](Executor::execute).
    type Future: Future<Output = Result<CachedRecord, BoxError>> + Send;

    /// Produces the record for `key` at time `now`.
    fn execute(self, now: i64, key: &CacheKey) -> Self::Future;
}

impl<F, Fut> Executor for F
where
    F: FnOnce(i64, CacheKey) -> Fut,
    Fut: Future<Output = Result<CachedRecord, BoxError>> + Send,
{
    type Future = Fut;

    fn execute(self, now: i64, key: &CacheKey) -> Fut {
        self(now, key.clone())
    }
}
