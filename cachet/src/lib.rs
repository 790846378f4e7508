#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod directive;
pub mod error;
pub mod executor;
pub mod handler;
pub mod metrics;
pub mod policy;
pub mod validator;

pub use cachet_backend::{Backend, BackendError, CacheBackend, DeleteStatus};
pub use cachet_core::{CacheKey, CachedRecord, Clock, ManualClock, RequestView, SystemClock};
pub use config::{RouteCacheConfig, RouteCacheConfigBuilder};
pub use directive::DirectiveSet;
pub use error::{BoxError, CacheError, ConfigError};
pub use executor::Executor;
pub use handler::CacheHandler;
pub use metrics::{MetricsRecorder, MetricsSink, NoopMetrics};
pub use policy::{EnabledCacheConfig, PolicyConfig};
pub use validator::{ValidationReason, Validator};
