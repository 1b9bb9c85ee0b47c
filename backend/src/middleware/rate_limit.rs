//! Per-client admission middleware backed by the domain [`RateGuard`].
//!
//! Requests are keyed by the client address actix reports (honouring
//! `Forwarded`/`X-Forwarded-For`). Rejected requests never reach the handler
//! and receive a `429` with the standard error body.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::{RateGuard, TraceId};

const UNKNOWN_PEER: &str = "unknown";

/// Middleware rejecting clients that exceed their request allowance.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::App;
/// use mockable::DefaultClock;
/// use ride_dispatch::domain::{RateGuard, RateGuardConfig};
/// use ride_dispatch::middleware::RateLimit;
///
/// let guard = Arc::new(RateGuard::new(RateGuardConfig::default(), Arc::new(DefaultClock)));
/// let app = App::new().wrap(RateLimit::new(guard));
/// ```
#[derive(Clone)]
pub struct RateLimit {
    guard: Arc<RateGuard>,
}

impl RateLimit {
    /// Wrap the shared guard.
    pub fn new(guard: Arc<RateGuard>) -> Self {
        Self { guard }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            guard: self.guard.clone(),
        }))
    }
}

/// Service wrapper produced by [`RateLimit`].
pub struct RateLimitMiddleware<S> {
    service: S,
    guard: Arc<RateGuard>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let key = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or(UNKNOWN_PEER)
            .to_owned();

        match self.guard.check(&key) {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(rejected) => Box::pin(async move {
                warn!(client = %key, path = %req.path(), "rate limit exceeded");
                let rejected = match TraceId::current() {
                    Some(id) => rejected.with_trace_id(id.to_string()),
                    None => rejected,
                };
                let response = rejected.error_response().map_into_right_body();
                Ok(req.into_response(response))
            }),
        }
    }
}
