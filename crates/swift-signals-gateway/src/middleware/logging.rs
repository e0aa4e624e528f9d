//! Request identification and access logging.
//!
//! `tower_http` assigns the request ID ([`SetRequestIdLayer`], reusing an inbound
//! `X-Request-ID` or generating a UUID v4), copies it onto the response
//! ([`PropagateRequestIdLayer`]) and runs a [`TraceLayer`] whose `request` span carries
//! `request_id`, `method` and `path`. [`seed_scope`] then records the ID and span on
//! the [`RequestScope`] the handlers and RPC clients read.

use std::time::Duration;

use axum::extract::Request;
use axum::http::HeaderName;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use tracing::Span;

use swift_signals_core::RequestScope;

/// Correlation header, read from the request and always set on the response.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Wrap `router` with request IDs, the request span and the access log.
pub fn request_tracing<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(middleware::from_fn(seed_scope))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span)
                .on_request(log_request_started)
                .on_response(log_request_completed),
        )
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
}

fn request_id(req: &Request) -> &str {
    req.extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or_default()
}

fn make_request_span(req: &Request) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id(req),
        method = %req.method(),
        path = %req.uri().path(),
    )
}

fn log_request_started(_req: &Request, _span: &Span) {
    tracing::info!("request started");
}

fn log_request_completed(response: &Response, latency: Duration, _span: &Span) {
    let duration_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
    tracing::info!(
        status_code = response.status().as_u16(),
        duration_ms,
        "request completed"
    );
}

/// Seed the [`RequestScope`] with the request ID and the current `request` span.
pub async fn seed_scope(mut req: Request, next: Next) -> Response {
    let scope = RequestScope::new(request_id(&req)).with_span(Span::current());
    req.extensions_mut().insert(scope);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::get;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::extract::Scope;

    async fn echo_scope(Scope(scope): Scope) -> String {
        scope.request_id().to_string()
    }

    fn app() -> Router {
        request_tracing(Router::new().route("/", get(echo_scope)))
    }

    #[tokio::test]
    async fn inbound_id_is_echoed() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("X-Request-ID", "req-abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-request-id"], "req-abc");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"req-abc");
    }

    #[tokio::test]
    async fn missing_id_is_generated_and_seeded() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers()["x-request-id"]
            .to_str()
            .unwrap()
            .to_string();
        assert!(Uuid::parse_str(&id).is_ok(), "{id}");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(std::str::from_utf8(&body).unwrap(), id);
    }

    #[tokio::test]
    async fn header_is_set_on_errors_too() {
        let response = app()
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-request-id"));
    }
}
