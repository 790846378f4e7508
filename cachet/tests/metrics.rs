//! Tests for verifying cache outcome metrics.

#![cfg(feature = "metrics")]

mod common;

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use cachet::{CacheHandler, ManualClock, MetricsRecorder, RequestView, RouteCacheConfig};
use common::{MockBackend, upstream};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

fn counter(snapshotter: &Snapshotter, name: &str) -> u64 {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(key, _, _, _)| key.key().name() == name)
        .filter(|(key, _, _, _)| key.key().labels().any(|l| l.value() == "users"))
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => v,
            _ => 0,
        })
        .sum()
}

#[tokio::test]
async fn outcomes_are_counted_per_route() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let _guard = metrics::set_default_local_recorder(&recorder);

    let clock = ManualClock::new(0);
    let config = RouteCacheConfig::builder("users")
        .store(MockBackend::new())
        .clock(clock.clone())
        .min_age(1)
        .max_age(10)
        .build()
        .unwrap();
    let handler = CacheHandler::with_metrics(config, MetricsRecorder);
    let request = RequestView::new("users", "id=1");
    let calls = Arc::new(AtomicUsize::new(0));

    handler
        .handle(&request, upstream(&calls, "v1"))
        .await
        .unwrap();
    clock.set(5);
    handler
        .handle(&request, upstream(&calls, "v2"))
        .await
        .unwrap();
    clock.set(30);
    handler
        .handle(&request, upstream(&calls, "v3"))
        .await
        .unwrap();

    assert_eq!(counter(&snapshotter, "cachet_cache_miss_total"), 1);
    assert_eq!(counter(&snapshotter, "cachet_cache_hit_total"), 1);
    assert_eq!(counter(&snapshotter, "cachet_cache_add_total"), 2);
    assert_eq!(counter(&snapshotter, "cachet_cache_evict_total"), 1);
    assert_eq!(counter(&snapshotter, "cachet_cache_error_total"), 0);
}
