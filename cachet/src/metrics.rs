//! Cache outcome metrics.
//!
//! The handler reports every outcome to a [`MetricsSink`]. [`NoopMetrics`]
//! discards them. [`MetricsRecorder`] forwards them to the `metrics` facade
//! when the `metrics` feature is enabled and is a no-op otherwise.
//!
//! ## Naming Pattern
//!
//! - `cachet_cache_{hit,miss,add,error,evict}_total` - counters labelled by `route`
//! - `cachet_cache_evict_age_seconds` - age of evicted records, labelled by `route` and `reason`

use std::fmt::Debug;
use std::sync::Arc;

use crate::validator::ValidationReason;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

/// Receives cache outcome events for a route.
pub trait MetricsSink: Debug + Send + Sync {
    /// A fresh record was written back to the store.
    fn add(&self, route: &str);
    /// The store had no record for the key.
    fn miss(&self, route: &str);
    /// A cached record was served, fresh or stale.
    fn hit(&self, route: &str);
    /// A store read or write failed.
    fn err(&self, route: &str);
    /// A cached record was rejected by a validator.
    fn evict(&self, route: &str, reason: ValidationReason, age: i64);
}

impl<T: MetricsSink + ?Sized> MetricsSink for Arc<T> {
    fn add(&self, route: &str) {
        (**self).add(route)
    }

    fn miss(&self, route: &str) {
        (**self).miss(route)
    }

    fn hit(&self, route: &str) {
        (**self).hit(route)
    }

    fn err(&self, route: &str) {
        (**self).err(route)
    }

    fn evict(&self, route: &str, reason: ValidationReason, age: i64) {
        (**self).evict(route, reason, age)
    }
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn add(&self, _route: &str) {}
    fn miss(&self, _route: &str) {}
    fn hit(&self, _route: &str) {}
    fn err(&self, _route: &str) {}
    fn evict(&self, _route: &str, _reason: ValidationReason, _age: i64) {}
}

/// Sink that reports to the global `metrics` recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsRecorder;

impl MetricsSink for MetricsRecorder {
    fn add(&self, route: &str) {
        record_add(route);
    }

    fn miss(&self, route: &str) {
        record_miss(route);
    }

    fn hit(&self, route: &str) {
        record_hit(route);
    }

    fn err(&self, route: &str) {
        record_error(route);
    }

    fn evict(&self, route: &str, reason: ValidationReason, age: i64) {
        record_evict(route, reason, age);
    }
}

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track number of cache hit events.
    pub static ref CACHE_HIT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "cachet_cache_hit_total",
            "Total number of responses served from the cache."
        );
        "cachet_cache_hit_total"
    };
    /// Track number of cache miss events.
    pub static ref CACHE_MISS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "cachet_cache_miss_total",
            "Total number of lookups that found no record."
        );
        "cachet_cache_miss_total"
    };
    /// Track number of records written back.
    pub static ref CACHE_ADD_COUNTER: &'static str = {
        metrics::describe_counter!(
            "cachet_cache_add_total",
            "Total number of fresh records written to the store."
        );
        "cachet_cache_add_total"
    };
    /// Track number of store failures.
    pub static ref CACHE_ERROR_COUNTER: &'static str = {
        metrics::describe_counter!(
            "cachet_cache_error_total",
            "Total number of store read and write failures."
        );
        "cachet_cache_error_total"
    };
    /// Track number of rejected records.
    pub static ref CACHE_EVICT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "cachet_cache_evict_total",
            "Total number of cached records rejected by a validator."
        );
        "cachet_cache_evict_total"
    };
    /// Age of rejected records.
    pub static ref CACHE_EVICT_AGE: &'static str = {
        metrics::describe_histogram!(
            "cachet_cache_evict_age_seconds",
            metrics::Unit::Seconds,
            "Age of cached records at the time they were rejected."
        );
        "cachet_cache_evict_age_seconds"
    };
}

#[cfg(feature = "metrics")]
#[inline]
fn record_add(route: &str) {
    metrics::counter!(*CACHE_ADD_COUNTER, "route" => route.to_string()).increment(1);
}

#[cfg(feature = "metrics")]
#[inline]
fn record_miss(route: &str) {
    metrics::counter!(*CACHE_MISS_COUNTER, "route" => route.to_string()).increment(1);
}

#[cfg(feature = "metrics")]
#[inline]
fn record_hit(route: &str) {
    metrics::counter!(*CACHE_HIT_COUNTER, "route" => route.to_string()).increment(1);
}

#[cfg(feature = "metrics")]
#[inline]
fn record_error(route: &str) {
    metrics::counter!(*CACHE_ERROR_COUNTER, "route" => route.to_string()).increment(1);
}

#[cfg(feature = "metrics")]
#[inline]
fn record_evict(route: &str, reason: ValidationReason, age: i64) {
    metrics::counter!(
        *CACHE_EVICT_COUNTER,
        "route" => route.to_string(),
        "reason" => reason.as_str()
    )
    .increment(1);
    metrics::histogram!(
        *CACHE_EVICT_AGE,
        "route" => route.to_string(),
        "reason" => reason.as_str()
    )
    .record(age as f64);
}

#[cfg(not(feature = "metrics"))]
#[inline]
fn record_add(_route: &str) {}

#[cfg(not(feature = "metrics"))]
#[inline]
fn record_miss(_route: &str) {}

#[cfg(not(feature = "metrics"))]
#[inline]
fn record_hit(_route: &str) {}

#[cfg(not(feature = "metrics"))]
#[inline]
fn record_error(_route: &str) {}

#[cfg(not(feature = "metrics"))]
#[inline]
fn record_evict(_route: &str, _reason: ValidationReason, _age: i64) {}
