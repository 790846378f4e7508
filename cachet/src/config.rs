//! Per-route cache configuration.
//!
//! A route is configured once through [`RouteCacheConfig::builder`] and the
//! result is immutable. The builder enforces the freshness invariants:
//!
//! - `0 <= min_age <= max_age`
//! - `max_age > 0`, unless both ages are zero, which disables caching
//!   (with `min_age <= max_age` this leaves `max_age = 0` only for bypass)
//! - a route configured from an `Enabled` policy never bypasses
//! - only `GET` routes are cacheable
//!
//! Ages are whole seconds.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use cachet_backend::Backend;
use cachet_core::{Clock, SystemClock};
use http::Method;
use smol_str::SmolStr;

use crate::error::ConfigError;
use crate::policy::PolicyConfig;

/// Immutable cache settings of one route.
#[derive(Clone)]
pub struct RouteCacheConfig {
    route: SmolStr,
    method: Method,
    store: Arc<dyn Backend>,
    clock: Arc<dyn Clock>,
    min_age: i64,
    max_age: i64,
    allow_stale: bool,
    store_timeout: Option<Duration>,
}

impl fmt::Debug for RouteCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteCacheConfig")
            .field("route", &self.route)
            .field("method", &self.method)
            .field("store", &self.store.label())
            .field("clock", &self.clock)
            .field("min_age", &self.min_age)
            .field("max_age", &self.max_age)
            .field("allow_stale", &self.allow_stale)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

impl RouteCacheConfig {
    /// Starts configuring the route named `route`.
    pub fn builder(route: impl Into<SmolStr>) -> RouteCacheConfigBuilder {
        RouteCacheConfigBuilder::new(route)
    }

    /// Route name used in logs and metrics.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Cached HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Store holding the route's records.
    pub fn store(&self) -> &dyn Backend {
        self.store.as_ref()
    }

    /// Time source of the route.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Age below which client directives cannot force a refresh.
    pub fn min_age(&self) -> i64 {
        self.min_age
    }

    /// Route TTL in seconds.
    pub fn max_age(&self) -> i64 {
        self.max_age
    }

    /// Width of the window a client may demand freshness within.
    pub fn max_fresh(&self) -> i64 {
        self.max_age - self.min_age
    }

    /// Whether a stale record may stand in for a failed refresh.
    pub fn allow_stale(&self) -> bool {
        self.allow_stale
    }

    /// Upper bound on a single store call.
    pub fn store_timeout(&self) -> Option<Duration> {
        self.store_timeout
    }

    /// Whether caching is disabled for the route.
    pub fn is_bypass(&self) -> bool {
        self.min_age == 0 && self.max_age == 0
    }

    /// TTL handed to the store on write-back.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.max_age.max(0).unsigned_abs())
    }
}

/// Builder for [`RouteCacheConfig`].
pub struct RouteCacheConfigBuilder {
    route: SmolStr,
    method: Method,
    store: Option<Arc<dyn Backend>>,
    clock: Option<Arc<dyn Clock>>,
    min_age: i64,
    max_age: i64,
    allow_stale: bool,
    store_timeout: Option<Duration>,
    policy_enabled: bool,
}

impl RouteCacheConfigBuilder {
    fn new(route: impl Into<SmolStr>) -> Self {
        Self {
            route: route.into(),
            method: Method::GET,
            store: None,
            clock: None,
            min_age: 0,
            max_age: 0,
            allow_stale: false,
            store_timeout: None,
            policy_enabled: false,
        }
    }

    /// Sets the store.
    pub fn store<B: Backend + 'static>(mut self, store: B) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Sets a store shared with other routes.
    pub fn shared_store(mut self, store: Arc<dyn Backend>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the clock.
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Uses the wall clock.
    pub fn system_clock(self) -> Self {
        self.clock(SystemClock)
    }

    /// Sets the cached method. Anything but `GET` fails to build.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the minimum age in seconds.
    pub fn min_age(mut self, seconds: i64) -> Self {
        self.min_age = seconds;
        self
    }

    /// Sets the route TTL in seconds.
    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = seconds;
        self
    }

    /// Allows serving the last valid record when a refresh fails.
    pub fn allow_stale(mut self, allow_stale: bool) -> Self {
        self.allow_stale = allow_stale;
        self
    }

    /// Bounds every store call; an elapsed call counts as a store failure.
    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    /// Applies a deserialized policy over the current settings.
    pub fn policy(mut self, policy: PolicyConfig) -> Self {
        match policy {
            PolicyConfig::Enabled(config) => {
                self.min_age = config.min_age.map(whole_seconds).unwrap_or(0);
                self.max_age = config.max_age.map(whole_seconds).unwrap_or(0);
                self.allow_stale = config.allow_stale;
                self.store_timeout = config.store_timeout;
                self.policy_enabled = true;
            }
            PolicyConfig::Disabled => {
                self.min_age = 0;
                self.max_age = 0;
                self.policy_enabled = false;
            }
        }
        self
    }

    /// Validates the settings.
    pub fn build(self) -> Result<RouteCacheConfig, ConfigError> {
        if self.method != Method::GET {
            return Err(ConfigError::MethodNotCacheable(self.method));
        }
        if self.min_age < 0 {
            return Err(ConfigError::NegativeMinAge(self.min_age));
        }
        if self.max_age < 0 {
            return Err(ConfigError::NegativeMaxAge(self.max_age));
        }
        if self.policy_enabled && self.max_age == 0 {
            return Err(ConfigError::ZeroMaxAge(self.route.to_string()));
        }
        if self.min_age > self.max_age {
            return Err(ConfigError::MinAgeExceedsMaxAge {
                min_age: self.min_age,
                max_age: self.max_age,
            });
        }
        let store = self
            .store
            .ok_or_else(|| ConfigError::MissingStore(self.route.to_string()))?;
        let clock = self
            .clock
            .ok_or_else(|| ConfigError::MissingClock(self.route.to_string()))?;
        Ok(RouteCacheConfig {
            route: self.route,
            method: self.method,
            store,
            clock,
            min_age: self.min_age,
            max_age: self.max_age,
            allow_stale: self.allow_stale,
            store_timeout: self.store_timeout,
        })
    }
}

fn whole_seconds(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}
