//! Request metrics middleware
//!
//! Records count and latency per matched route template, so `/v1/journals/{key}`
//! is one series no matter which journal was requested.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use fuglelitt_common::metrics::RequestMetrics;

pub async fn track_requests(request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let tracker = RequestMetrics::start(request.method().as_str(), &endpoint);

    let response = next.run(request).await;
    tracker.finish(response.status().as_u16());
    response
}
