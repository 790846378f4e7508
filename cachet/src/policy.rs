use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Freshness bounds and stale handling of a caching route.
///
/// Missing fields take their values from [`Default`], so an empty mapping
/// caches for five seconds.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct EnabledCacheConfig {
    /// Age below which a record is never refreshed on client demand (e.g., "1s", "1m").
    #[serde(with = "humantime_serde")]
    pub min_age: Option<Duration>,
    /// Route TTL: age beyond which a record is always refreshed (e.g., "10s", "5m").
    #[serde(with = "humantime_serde")]
    pub max_age: Option<Duration>,
    /// Serve the last valid record when a refresh fails.
    pub allow_stale: bool,
    /// Upper bound on a single store call (e.g., "50ms").
    #[serde(with = "humantime_serde")]
    pub store_timeout: Option<Duration>,
}

impl Default for EnabledCacheConfig {
    fn default() -> Self {
        Self {
            min_age: None,
            max_age: Some(Duration::from_secs(5)),
            allow_stale: false,
            store_timeout: None,
        }
    }
}

/// Serializable route policy.
///
/// Ages are whole seconds; sub-second parts are dropped when the policy is
/// applied to a [`RouteCacheConfigBuilder`](crate::RouteCacheConfigBuilder).
/// `Disabled` is the same as `min_age = max_age = 0`: every request goes
/// straight to the executor. An `Enabled` policy whose `max_age` rounds
/// down to zero is rejected when the route is built.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum PolicyConfig {
    /// Cache the route.
    Enabled(EnabledCacheConfig),
    /// Never touch the store.
    Disabled,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::Enabled(EnabledCacheConfig::default())
    }
}
