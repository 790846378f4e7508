use std::task::{Context, Poll};

use bytes::Bytes;
use cachet::{BoxError, CacheHandler, MetricsSink};
use cachet_core::RequestView;
use cachet_core::request::canonical_fields;
use futures::future::BoxFuture;
use http::header::CACHE_CONTROL;
use http::{HeaderName, Method, Request, Response};
use http_body::Body as HttpBody;
use http_body_util::Full;
use tower::Service;
use tracing::debug;

use crate::response::render;
use crate::upstream::{TowerUpstream, buffer};

/// Tower [`Service`] produced by [`CacheLayer`](crate::CacheLayer).
///
/// Responses are buffered, whether they came from the store or from the
/// wrapped service.
#[derive(Debug, Clone)]
pub struct CacheService<S, M> {
    inner: S,
    handler: CacheHandler<M>,
    status_header: HeaderName,
}

impl<S, M> CacheService<S, M> {
    /// Wraps `inner` with `handler`.
    pub fn new(inner: S, handler: CacheHandler<M>, status_header: HeaderName) -> Self {
        CacheService {
            inner,
            handler,
            status_header,
        }
    }
}

impl<S, M, ReqBody, ResBody> Service<Request<ReqBody>> for CacheService<S, M>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    M: MetricsSink + Clone + 'static,
    ReqBody: Send + 'static,
    ResBody: HttpBody + Send + 'static,
    ResBody::Data: Send,
    ResBody::Error: Into<BoxError>,
{
    type Response = Response<Full<Bytes>>;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // The clone may not be ready; keep it and call the one polled above.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        if req.method() != Method::GET {
            debug!(method = %req.method(), "not cacheable, passing through");
            let call = inner.call(req);
            return Box::pin(async move {
                let response = call.await.map_err(Into::<BoxError>::into)?;
                buffer(response).await
            });
        }

        let view = request_view(self.handler.config().route(), &req);
        let handler = self.handler.clone();
        let status_header = self.status_header.clone();
        Box::pin(async move {
            let record = handler
                .handle(&view, TowerUpstream::new(inner, req))
                .await?;
            render(record, &status_header)
        })
    }
}

/// Derives the cache view of `req` for the route named `route`.
pub fn request_view<B>(route: &str, req: &Request<B>) -> RequestView {
    let fields = match req.uri().query() {
        Some(query) => match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
            Ok(pairs) => canonical_fields(pairs),
            Err(_) => query.to_owned(),
        },
        None => String::new(),
    };
    let cache_control = req
        .headers()
        .get(CACHE_CONTROL)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    RequestView::new(route, fields).with_cache_control(cache_control)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_order_does_not_change_the_key() {
        let a = Request::get("/search?q=rust&page=2").body(()).unwrap();
        let b = Request::get("/search?page=2&q=rust").body(()).unwrap();
        assert_eq!(
            request_view("search", &a).cache_key(),
            request_view("search", &b).cache_key()
        );
        assert_eq!(
            request_view("search", &a).cache_key().as_str(),
            "search:page=2&q=rust"
        );
    }

    #[test]
    fn cache_control_header_is_captured() {
        let req = Request::get("/users")
            .header("Cache-Control", "max-age=3")
            .body(())
            .unwrap();
        let view = request_view("users", &req);
        assert_eq!(view.header_value, "max-age=3");
        assert_eq!(view.cache_key().as_str(), "users:");
    }
}
