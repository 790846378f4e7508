#![warn(missing_docs)]
//! # cachet-core
//!
//! Core types for the cachet HTTP response cache.
//!
//! This crate holds the pieces every other cachet crate agrees on and that
//! carry no I/O of their own:
//!
//! - [`CachedRecord`] - the cached response envelope
//! - [`CacheKey`] and [`RequestView`] - how a request maps to a cache entry
//! - [`Clock`] - the time source injected into a route
//! - [`etag`] - the fingerprint stamped on cached payloads
//! - [`BackendLabel`] - the name a store reports in logs and metrics
//!
//! Stores live in `cachet-backend` (and its adapters), while the request
//! orchestration lives in the `cachet` crate.

pub mod clock;
pub mod etag;
pub mod key;
pub mod label;
pub mod record;
pub mod request;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::CacheKey;
pub use label::BackendLabel;
pub use record::CachedRecord;
pub use request::RequestView;

/// Raw byte data type used for encoded cache records.
/// Using `Bytes` provides efficient zero-copy cloning via reference counting.
pub type Raw = bytes::Bytes;
