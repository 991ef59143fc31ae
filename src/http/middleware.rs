//! Middleware stack shared by both services.
//!
//! Layer order, outermost first:
//! ```text
//! normalize_request_id (unreadable ids become "unknown")
//!     → SetRequestId ("unknown" default)
//!     → PropagateRequestId (echo on response)
//!     → Trace (span with method, path, request_id)
//!     → track_requests (metrics)
//!     → catch_panic (last-resort 500)
//!     → Timeout (service-specific JSON error on expiry)
//!     → handlers
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    BoxError, Router,
};
use futures_util::FutureExt;
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

use crate::http::request::{normalize_request_id, RequestId, UnknownRequestId};
use crate::observability::metrics;

/// Builds a service's JSON error response for a request.
pub type ErrorResponder = fn(&RequestId) -> Response;

/// Error bodies a service answers with when the shared layers cut a request short.
#[derive(Debug, Clone, Copy)]
pub struct ErrorResponders {
    /// The request outlived the server-side timeout.
    pub timeout: ErrorResponder,
    /// A handler panicked or a layer failed unexpectedly.
    pub internal: ErrorResponder,
}

/// Wrap `router` in the shared layers. `service` labels metrics.
pub fn apply_common_layers(
    router: Router,
    service: &'static str,
    request_timeout: Duration,
    responders: ErrorResponders,
) -> Router {
    router
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(
                    move |request_id: RequestId, err: BoxError| async move {
                        handle_layer_error(responders, &request_id, err)
                    },
                ))
                .timeout(request_timeout),
        )
        .layer(middleware::from_fn_with_state(responders.internal, catch_panic))
        .layer(middleware::from_fn_with_state(service, metrics::track_requests))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(UnknownRequestId))
        .layer(middleware::from_fn(normalize_request_id))
}

fn handle_layer_error(responders: ErrorResponders, request_id: &RequestId, err: BoxError) -> Response {
    if err.is::<Elapsed>() {
        tracing::error!(request_id = %request_id, "Request exceeded the server timeout");
        (responders.timeout)(request_id)
    } else {
        tracing::error!(request_id = %request_id, error = %err, "Unhandled middleware error");
        (responders.internal)(request_id)
    }
}

fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = RequestId::from_headers(request.headers());
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// Convert a panic anywhere below this layer into the service's generic 500.
pub async fn catch_panic(
    State(on_panic): State<ErrorResponder>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let request_id = RequestId::from_headers(request.headers());

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            tracing::error!(
                request_id = %request_id,
                panic = %panic_message(payload.as_ref()),
                "Unhandled failure while serving request"
            );
            on_panic(&request_id)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderValue, StatusCode},
        response::IntoResponse,
        routing::get,
    };
    use tower::ServiceExt;

    use crate::http::request::X_REQUEST_ID;

    fn teapot(request_id: &RequestId) -> Response {
        (StatusCode::IM_A_TEAPOT, request_id.to_string()).into_response()
    }

    fn gateway_timeout(request_id: &RequestId) -> Response {
        (StatusCode::GATEWAY_TIMEOUT, format!("late {request_id}")).into_response()
    }

    fn app() -> Router {
        let router = Router::new()
            .route("/ok", get(|| async { "ok" }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "finished"
                }),
            )
            .route(
                "/boom",
                get(|| async {
                    if true {
                        panic!("handler exploded");
                    }
                    "unreachable"
                }),
            );
        let responders = ErrorResponders {
            timeout: gateway_timeout,
            internal: teapot,
        };
        apply_common_layers(router, "test", Duration::from_millis(100), responders)
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = app()
            .oneshot(
                Request::get("/ok")
                    .header(X_REQUEST_ID, "trace-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(X_REQUEST_ID),
            Some(&HeaderValue::from_static("trace-42"))
        );
    }

    #[tokio::test]
    async fn test_missing_request_id_echoes_unknown() {
        let response = app()
            .oneshot(Request::get("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(X_REQUEST_ID),
            Some(&HeaderValue::from_static("unknown"))
        );
    }

    #[tokio::test]
    async fn test_panic_becomes_service_response() {
        let response = app()
            .oneshot(
                Request::get("/boom")
                    .header(X_REQUEST_ID, "trace-7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(
            response.headers().get(X_REQUEST_ID),
            Some(&HeaderValue::from_static("trace-7"))
        );
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"trace-7");
    }

    #[tokio::test]
    async fn test_timeout_uses_service_responder() {
        let response = app()
            .oneshot(
                Request::get("/slow")
                    .header(X_REQUEST_ID, "trace-9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            response.headers().get(X_REQUEST_ID),
            Some(&HeaderValue::from_static("trace-9"))
        );
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"late trace-9");
    }

    #[tokio::test]
    async fn test_unreadable_request_id_is_echoed_as_unknown() {
        let response = app()
            .oneshot(
                Request::get("/boom")
                    .header(X_REQUEST_ID, HeaderValue::from_bytes(&[0xfa, 0xfb]).unwrap())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(X_REQUEST_ID),
            Some(&HeaderValue::from_static("unknown"))
        );
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"unknown");
    }

    #[test]
    fn test_panic_message_downcasts() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let borrowed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(borrowed.as_ref()), "static");
    }
}
