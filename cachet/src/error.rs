use cachet_backend::BackendError;
use http::Method;
use thiserror::Error;

/// Boxed error returned by executors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error returned by [`CacheHandler`](crate::CacheHandler).
///
/// Store failures during request handling never surface here; the handler
/// logs them and falls back to the executor. Only the explicit maintenance
/// calls ([`purge`](crate::CacheHandler::purge) and
/// [`invalidate`](crate::CacheHandler::invalidate)) report them.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The executor failed and no stale record could stand in for it.
    #[error("executor failed: {0}")]
    Executor(#[source] BoxError),

    /// A maintenance call against the store failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Invalid route cache configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No store was set.
    #[error("route {0} has no store configured")]
    MissingStore(String),

    /// No clock was set.
    #[error("route {0} has no clock configured")]
    MissingClock(String),

    /// Only `GET` responses can be cached.
    #[error("method {0} is not cacheable, only GET is")]
    MethodNotCacheable(Method),

    /// `min_age` is negative.
    #[error("min_age must not be negative, got {0}")]
    NegativeMinAge(i64),

    /// `min_age` is greater than `max_age`.
    #[error("min_age ({min_age}) must not exceed max_age ({max_age})")]
    MinAgeExceedsMaxAge {
        /// Configured minimum age.
        min_age: i64,
        /// Configured maximum age.
        max_age: i64,
    },

    /// `max_age` is negative.
    #[error("max_age must not be negative, got {0}")]
    NegativeMaxAge(i64),

    /// An enabled policy left the route with no lifetime.
    #[error("route {0} enables caching but its max_age is under one second")]
    ZeroMaxAge(String),
}
