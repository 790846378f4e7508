//! Adapter running the wrapped Tower service as a cache executor.

use bytes::Bytes;
use cachet::BoxError;
use cachet_core::{CacheKey, CachedRecord};
use futures::future::BoxFuture;
use http::{Request, Response};
use http_body::Body as HttpBody;
use http_body_util::{BodyExt, Full};
use tower::Service;
use tracing::debug;

/// One pending call of the wrapped service.
///
/// The service must already be ready: the executor calls it without
/// polling readiness again.
pub struct TowerUpstream<S, ReqBody> {
    service: S,
    request: Request<ReqBody>,
}

impl<S, ReqBody> TowerUpstream<S, ReqBody> {
    /// Wraps a ready `service` and the request to send it.
    pub fn new(service: S, request: Request<ReqBody>) -> Self {
        Self { service, request }
    }
}

impl<S, ReqBody, ResBody> cachet::Executor for TowerUpstream<S, ReqBody>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Send + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    ReqBody: Send + 'static,
    ResBody: HttpBody + Send + 'static,
    ResBody::Data: Send,
    ResBody::Error: Into<BoxError>,
{
    type Future = BoxFuture<'static, Result<CachedRecord, BoxError>>;

    fn execute(mut self, now: i64, key: &CacheKey) -> Self::Future {
        debug!(key = %key, "calling upstream service");
        let call = self.service.call(self.request);
        Box::pin(async move {
            let response = call.await.map_err(Into::<BoxError>::into)?;
            into_record(response, now).await
        })
    }
}

/// Buffers `response` into a record computed at `now`.
pub async fn into_record<ResBody>(
    response: Response<ResBody>,
    now: i64,
) -> Result<CachedRecord, BoxError>
where
    ResBody: HttpBody,
    ResBody::Error: Into<BoxError>,
{
    let (parts, body) = response.into_parts();
    let payload: Bytes = body
        .collect()
        .await
        .map_err(Into::<BoxError>::into)?
        .to_bytes();

    let mut record = CachedRecord::new(payload)
        .with_status(parts.status.as_u16())
        .with_last_valid_at(now);
    for (name, value) in &parts.headers {
        match value.to_str() {
            Ok(value) => record.set_header(name.as_str(), value),
            Err(_) => debug!(header = %name, "skipping non-text header"),
        }
    }
    Ok(record)
}

/// Buffers `response` without touching its headers.
pub async fn buffer<ResBody>(
    response: Response<ResBody>,
) -> Result<Response<Full<Bytes>>, BoxError>
where
    ResBody: HttpBody,
    ResBody::Error: Into<BoxError>,
{
    let (parts, body) = response.into_parts();
    let payload = body
        .collect()
        .await
        .map_err(Into::<BoxError>::into)?
        .to_bytes();
    Ok(Response::from_parts(parts, Full::new(payload)))
}
