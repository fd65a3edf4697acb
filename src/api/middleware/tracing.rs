//! HTTP request/response tracing middleware.

use axum::{body::Body, http::Request};
use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};

use crate::utils::extract_domain::host_from_headers;

type MakeSpanFn = fn(&Request<Body>) -> Span;

/// Creates a tracing middleware for HTTP requests.
///
/// The request span carries the `Host` header next to method and URI, since
/// the same path resolves to different projects on different hosts.
///
/// # Example Logs
///
/// ```text
/// INFO request{method=GET uri=/xY12abCD host=foo.directt.to}: finished processing request latency=3 ms status=307
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, MakeSpanFn> {
    TraceLayer::new_for_http()
        .make_span_with(make_span as MakeSpanFn)
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}

fn make_span(req: &Request<Body>) -> Span {
    tracing::span!(
        Level::INFO,
        "request",
        method = %req.method(),
        uri = %req.uri(),
        host = host_from_headers(req.headers()).unwrap_or("-"),
        version = ?req.version(),
    )
}
