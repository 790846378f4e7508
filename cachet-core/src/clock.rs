//! Time sources for cache routes.
//!
//! Every route owns a [`Clock`] returning the current time as whole Unix
//! seconds. Record ages, `Cache-Control` lifetimes and ETags are all
//! computed from this value, so tests swap in a [`ManualClock`] instead of
//! sleeping.

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// A source of the current time in Unix seconds.
pub trait Clock: Debug + Send + Sync {
    /// Returns the current time in seconds.
    fn now(&self) -> i64;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> i64 {
        (**self).now()
    }
}

/// Wall clock backed by [`chrono::Utc`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// give another to the route under test.
///
/// ```
/// use cachet_core::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1);
/// let handle = clock.clone();
/// handle.set(9);
/// assert_eq!(clock.now(), 9);
/// clock.advance(3);
/// assert_eq!(handle.now(), 12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Creates a clock stopped at `now`.
    pub fn new(now: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now)),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Moves the clock forward by `seconds`.
    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
