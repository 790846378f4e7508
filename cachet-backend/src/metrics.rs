//! Per-store metrics, recorded by [`CacheBackend`](crate::CacheBackend).
//!
//! Every function is a no-op unless the `metrics` feature is enabled. All
//! series carry a `backend` label with the store's [`BackendLabel`].
//!
//! | Name | Kind |
//! |------|------|
//! | `cachet_backend_{read,write}_total` | counter |
//! | `cachet_backend_{read,write}_bytes_total` | counter |
//! | `cachet_backend_{read,write}_errors_total` | counter |
//! | `cachet_backend_{read,write}_duration_seconds` | histogram |
//! | `cachet_backend_{decode,encode}_duration_seconds` | histogram |
//!
//! [`BackendLabel`]: cachet_core::BackendLabel

use std::time::Duration;

#[cfg(feature = "metrics")]
use std::time::Instant;

/// Direction of a store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `get` plus decoding.
    Read,
    /// Encoding plus `set_ttl`.
    Write,
}

#[cfg(feature = "metrics")]
struct OpNames {
    total: &'static str,
    bytes: &'static str,
    errors: &'static str,
    duration: &'static str,
    codec: &'static str,
}

#[cfg(feature = "metrics")]
const READ: OpNames = OpNames {
    total: "cachet_backend_read_total",
    bytes: "cachet_backend_read_bytes_total",
    errors: "cachet_backend_read_errors_total",
    duration: "cachet_backend_read_duration_seconds",
    codec: "cachet_backend_decode_duration_seconds",
};

#[cfg(feature = "metrics")]
const WRITE: OpNames = OpNames {
    total: "cachet_backend_write_total",
    bytes: "cachet_backend_write_bytes_total",
    errors: "cachet_backend_write_errors_total",
    duration: "cachet_backend_write_duration_seconds",
    codec: "cachet_backend_encode_duration_seconds",
};

#[cfg(feature = "metrics")]
lazy_static::lazy_static! {
    static ref DESCRIBED: () = {
        for (names, verb) in [(&READ, "read"), (&WRITE, "write")] {
            metrics::describe_counter!(
                names.total,
                format!("Store {verb} operations per backend.")
            );
            metrics::describe_counter!(names.bytes, format!("Bytes {verb} per backend."));
            metrics::describe_counter!(names.errors, format!("Failed store {verb}s per backend."));
            metrics::describe_histogram!(
                names.duration,
                metrics::Unit::Seconds,
                format!("Raw store {verb} latency.")
            );
        }
        metrics::describe_histogram!(READ.codec, metrics::Unit::Seconds, "Record decode latency.");
        metrics::describe_histogram!(WRITE.codec, metrics::Unit::Seconds, "Record encode latency.");
    };
}

#[cfg(feature = "metrics")]
impl Op {
    fn names(self) -> &'static OpNames {
        lazy_static::initialize(&DESCRIBED);
        match self {
            Op::Read => &READ,
            Op::Write => &WRITE,
        }
    }
}

/// Measures elapsed time only when metrics are compiled in.
pub struct Timer {
    #[cfg(feature = "metrics")]
    start: Instant,
}

impl Timer {
    #[inline]
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "metrics")]
            start: Instant::now(),
        }
    }

    /// `Duration::ZERO` without the `metrics` feature.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        #[cfg(feature = "metrics")]
        let elapsed = self.start.elapsed();
        #[cfg(not(feature = "metrics"))]
        let elapsed = Duration::ZERO;
        elapsed
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// A completed store operation that moved `bytes`.
#[cfg(feature = "metrics")]
pub fn record_op(op: Op, backend: &str, duration: Duration, bytes: usize) {
    let names = op.names();
    metrics::counter!(names.total, "backend" => backend.to_owned()).increment(1);
    metrics::counter!(names.bytes, "backend" => backend.to_owned()).increment(bytes as u64);
    metrics::histogram!(names.duration, "backend" => backend.to_owned())
        .record(duration.as_secs_f64());
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_op(_op: Op, _backend: &str, _duration: Duration, _bytes: usize) {}

/// A failed store operation, including encode and decode failures.
#[cfg(feature = "metrics")]
pub fn record_error(op: Op, backend: &str) {
    metrics::counter!(op.names().errors, "backend" => backend.to_owned()).increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_error(_op: Op, _backend: &str) {}

/// Time spent decoding (`Read`) or encoding (`Write`) a record.
#[cfg(feature = "metrics")]
pub fn record_codec(op: Op, backend: &str, duration: Duration) {
    metrics::histogram!(op.names().codec, "backend" => backend.to_owned())
        .record(duration.as_secs_f64());
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_codec(_op: Op, _backend: &str, _duration: Duration) {}
