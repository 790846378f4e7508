//! Builder for configuring [`MokaBackend`].

use std::time::{Duration, Instant};

use cachet_backend::format::{Format, JsonFormat};
use cachet_core::{BackendLabel, CacheKey};
use moka::Expiry;
use moka::future::{Cache, CacheBuilder};
use moka::policy::EvictionPolicy;

use crate::backend::{Entry, MokaBackend};

/// Expires every entry after the TTL it was last written with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Expiration;

impl Expiry<CacheKey, Entry> for Expiration {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        // An overwrite restarts the lifetime with the new TTL.
        Some(value.ttl)
    }
}

/// Marker type: capacity has not been configured yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapacity;

/// Marker type: the cache holds at most `n` entries.
#[derive(Debug, Clone, Copy)]
pub struct EntryCapacity(pub(crate) u64);

/// Marker type: the cache holds at most `n` bytes, approximately.
#[derive(Debug, Clone, Copy)]
pub struct ByteCapacity(pub(crate) u64);

/// Builder for a [`MokaBackend`].
///
/// Exactly one of [`max_entries`](Self::max_entries) or
/// [`max_bytes`](Self::max_bytes) must be called; `build` only exists once
/// capacity is known.
pub struct MokaBackendBuilder<Cap, S = JsonFormat>
where
    S: Format,
{
    capacity: Cap,
    serializer: S,
    label: BackendLabel,
    eviction_policy: Option<EvictionPolicy>,
}

impl MokaBackendBuilder<NoCapacity, JsonFormat> {
    /// Creates a builder with no capacity configured.
    pub fn new() -> Self {
        Self {
            capacity: NoCapacity,
            serializer: JsonFormat,
            label: BackendLabel::new_static("moka"),
            eviction_policy: None,
        }
    }
}

impl Default for MokaBackendBuilder<NoCapacity, JsonFormat> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Format> MokaBackendBuilder<NoCapacity, S> {
    /// Bounds the cache by entry count.
    pub fn max_entries(self, capacity: u64) -> MokaBackendBuilder<EntryCapacity, S> {
        MokaBackendBuilder {
            capacity: EntryCapacity(capacity),
            serializer: self.serializer,
            label: self.label,
            eviction_policy: self.eviction_policy,
        }
    }

    /// Bounds the cache by approximate memory usage of keys and entries.
    pub fn max_bytes(self, bytes: u64) -> MokaBackendBuilder<ByteCapacity, S> {
        MokaBackendBuilder {
            capacity: ByteCapacity(bytes),
            serializer: self.serializer,
            label: self.label,
            eviction_policy: self.eviction_policy,
        }
    }
}

impl<Cap, S: Format> MokaBackendBuilder<Cap, S> {
    /// Sets the label reported in logs and metrics. Defaults to `"moka"`.
    pub fn label(mut self, label: impl Into<BackendLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the eviction policy.
    ///
    /// Defaults to TinyLFU for entry capacity and LRU for byte capacity.
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = Some(policy);
        self
    }

    /// Sets the record format. Defaults to [`JsonFormat`].
    pub fn value_format<NewS: Format>(self, serializer: NewS) -> MokaBackendBuilder<Cap, NewS> {
        MokaBackendBuilder {
            capacity: self.capacity,
            serializer,
            label: self.label,
            eviction_policy: self.eviction_policy,
        }
    }
}

impl<S: Format> MokaBackendBuilder<EntryCapacity, S> {
    /// Builds a store bounded by entry count.
    pub fn build(self) -> MokaBackend<S> {
        let policy = self
            .eviction_policy
            .unwrap_or_else(EvictionPolicy::tiny_lfu);
        let cache: Cache<CacheKey, Entry> = CacheBuilder::new(self.capacity.0)
            .eviction_policy(policy)
            .expire_after(Expiration)
            .build();

        MokaBackend {
            cache,
            serializer: self.serializer,
            label: self.label,
        }
    }
}

impl<S: Format> MokaBackendBuilder<ByteCapacity, S> {
    /// Builds a store bounded by approximate memory usage.
    ///
    /// Uses LRU by default: TinyLFU admission may reject a new entry even when
    /// evicting would make room, which is surprising with weighted entries.
    pub fn build(self) -> MokaBackend<S> {
        let policy = self.eviction_policy.unwrap_or_else(EvictionPolicy::lru);
        let cache: Cache<CacheKey, Entry> = CacheBuilder::new(self.capacity.0)
            .weigher(byte_weigher)
            .eviction_policy(policy)
            .expire_after(Expiration)
            .build();

        MokaBackend {
            cache,
            serializer: self.serializer,
            label: self.label,
        }
    }
}

fn byte_weigher(key: &CacheKey, entry: &Entry) -> u32 {
    u32::try_from(key.memory_size() + entry.memory_size()).unwrap_or(u32::MAX)
}
