use cachet::{CacheHandler, MetricsSink, NoopMetrics};
use http::HeaderName;
use tower::Layer;

use crate::response::DEFAULT_CACHE_STATUS_HEADER;
use crate::service::CacheService;

/// Tower [`Layer`] caching one route.
#[derive(Debug, Clone)]
pub struct CacheLayer<M = NoopMetrics> {
    handler: CacheHandler<M>,
    status_header: HeaderName,
}

impl<M: MetricsSink> CacheLayer<M> {
    /// Creates a layer serving through `handler`.
    pub fn new(handler: CacheHandler<M>) -> Self {
        CacheLayer {
            handler,
            status_header: DEFAULT_CACHE_STATUS_HEADER,
        }
    }

    /// Sets the name of the cache status response header.
    pub fn status_header(mut self, name: HeaderName) -> Self {
        self.status_header = name;
        self
    }
}

impl<S, M> Layer<S> for CacheLayer<M>
where
    M: Clone,
{
    type Service = CacheService<S, M>;

    fn layer(&self, inner: S) -> Self::Service {
        CacheService::new(inner, self.handler.clone(), self.status_header.clone())
    }
}
