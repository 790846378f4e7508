//! Tower middleware for the cachet HTTP response cache.
//!
//! [`CacheLayer`] wraps any Tower HTTP service with a
//! [`CacheHandler`](cachet::CacheHandler). `GET` requests are served from
//! the route's store when possible and the wrapped service runs only when a
//! fresh response is needed. Every other method passes straight through.
//!
//! The cache key is the route name followed by the canonical query string,
//! so `?b=2&a=1` and `?a=1&b=2` share an entry.
//!
//! # Quick Start
//!
//! ```
//! use bytes::Bytes;
//! use cachet::{CacheHandler, RouteCacheConfig};
//! use cachet_moka::MokaBackend;
//! use cachet_tower::CacheLayer;
//! use http_body_util::Full;
//! use tower::{ServiceBuilder, service_fn};
//!
//! let config = RouteCacheConfig::builder("hello")
//!     .store(MokaBackend::builder().max_entries(1000).build())
//!     .system_clock()
//!     .min_age(1)
//!     .max_age(60)
//!     .build()
//!     .unwrap();
//!
//! let service = ServiceBuilder::new()
//!     .layer(CacheLayer::new(CacheHandler::new(config)))
//!     .service(service_fn(|_req: http::Request<Full<Bytes>>| async {
//!         Ok::<_, std::convert::Infallible>(http::Response::new(Full::new(Bytes::from("Hello"))))
//!     }));
//! ```
//!
//! # Response Headers
//!
//! Besides `etag`, `cache-control` and `warning`, the middleware adds a
//! cache status header to every cached route's response:
//!
//! | Header Value | Meaning |
//! |--------------|---------|
//! | `HIT` | Served from the store |
//! | `MISS` | Computed by the wrapped service |
//! | `STALE` | Last valid record served in place of a fresh one |
//!
//! The header name defaults to `x-cache-status` and can be changed with
//! [`CacheLayer::status_header`].

pub mod layer;
pub mod response;
pub mod service;
pub mod upstream;

pub use layer::CacheLayer;
pub use response::{CacheStatus, DEFAULT_CACHE_STATUS_HEADER};
pub use service::CacheService;
