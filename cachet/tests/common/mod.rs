#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cachet::{BoxError, Executor, MetricsSink, ValidationReason};
use cachet_backend::{Backend, BackendError, BackendResult, DeleteStatus, StoredValue};
use cachet_core::{BackendLabel, CacheKey, CachedRecord, Raw};
use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct BackendCounters {
    pub read_count: AtomicUsize,
    pub write_count: AtomicUsize,
    pub remove_count: AtomicUsize,
}

/// Failure injection switches, flipped by tests while a handler holds the store.
#[derive(Debug, Default)]
pub struct Faults {
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub delay: Mutex<Option<Duration>>,
}

#[derive(Clone, Debug, Default)]
pub struct MockBackend {
    pub cache: Arc<DashMap<CacheKey, (Raw, Duration)>>,
    pub counters: Arc<BackendCounters>,
    pub faults: Arc<Faults>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_count(&self) -> usize {
        self.counters.read_count.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.counters.write_count.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.faults.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.faults.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn delay(&self, delay: Duration) {
        *self.faults.delay.lock().unwrap() = Some(delay);
    }

    pub fn put_raw(&self, key: &CacheKey, value: impl Into<Raw>) {
        self.cache
            .insert(key.clone(), (value.into(), Duration::from_secs(60)));
    }

    pub fn ttl_of(&self, key: &CacheKey) -> Option<Duration> {
        self.cache.get(key).map(|entry| entry.value().1)
    }

    async fn pause(&self) {
        let delay = *self.faults.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn injected() -> BackendError {
    BackendError::ConnectionError("injected failure".into())
}

#[async_trait]
impl Backend for MockBackend {
    async fn get(&self, key: &CacheKey) -> BackendResult<Option<StoredValue>> {
        self.counters.read_count.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.faults.fail_reads.load(Ordering::SeqCst) {
            return Err(injected());
        }
        Ok(self
            .cache
            .get(key)
            .map(|entry| StoredValue::Bytes(entry.value().0.clone())))
    }

    async fn set_ttl(&self, key: &CacheKey, value: Raw, ttl: Duration) -> BackendResult<()> {
        self.counters.write_count.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.faults.fail_writes.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.cache.insert(key.clone(), (value, ttl));
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        self.counters.remove_count.fetch_add(1, Ordering::SeqCst);
        Ok(match self.cache.remove(key) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    async fn purge(&self) -> BackendResult<()> {
        self.cache.clear();
        Ok(())
    }

    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("mock")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Add,
    Miss,
    Hit,
    Err,
    Evict(ValidationReason, i64),
}

#[derive(Debug, Clone, Default)]
pub struct RecordingMetrics {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingMetrics {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl MetricsSink for RecordingMetrics {
    fn add(&self, _route: &str) {
        self.push(Event::Add);
    }

    fn miss(&self, _route: &str) {
        self.push(Event::Miss);
    }

    fn hit(&self, _route: &str) {
        self.push(Event::Hit);
    }

    fn err(&self, _route: &str) {
        self.push(Event::Err);
    }

    fn evict(&self, _route: &str, reason: ValidationReason, age: i64) {
        self.push(Event::Evict(reason, age));
    }
}

/// Executor returning `body`, counting its invocations.
pub fn upstream(calls: &Arc<AtomicUsize>, body: &'static str) -> impl Executor {
    let calls = calls.clone();
    move |now: i64, _key: CacheKey| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, BoxError>(CachedRecord::new(body).with_last_valid_at(now)) }
    }
}

/// Executor that always fails, counting its invocations.
pub fn failing(calls: &Arc<AtomicUsize>) -> impl Executor {
    let calls = calls.clone();
    move |_now: i64, _key: CacheKey| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move { Err::<CachedRecord, BoxError>("upstream unavailable".into()) }
    }
}

pub fn count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}
