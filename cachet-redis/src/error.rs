//! Error types for the Redis store.

use cachet_backend::BackendError;
use redis::RedisError;

/// Error type for Redis store operations.
///
/// Appears when building with an invalid connection URL, or when an
/// operation fails against the server. The connection is established
/// lazily, so an unreachable server only shows up on first use.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the underlying Redis client.
    #[error("Redis backend error: {0}")]
    Redis(#[from] RedisError),
}

impl From<Error> for BackendError {
    fn from(error: Error) -> Self {
        let Error::Redis(err) = &error;
        if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
            Self::ConnectionError(Box::new(error))
        } else {
            Self::InternalError(Box::new(error))
        }
    }
}
