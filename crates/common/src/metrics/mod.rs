//! Metrics and observability utilities
//!
//! Prometheus metrics with latency histograms and a shared naming prefix.
//! The recorder itself is installed by the gateway binary; without one every
//! call here is a no-op.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Fuglelitt metrics
pub const METRICS_PREFIX: &str = "fuglelitt";

/// Histogram buckets for request and search latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Search metrics
    describe_counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of faceted searches"
    );

    describe_histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Faceted search latency in seconds"
    );

    describe_gauge!(
        format!("{}_search_results_count", METRICS_PREFIX),
        Unit::Count,
        "Matches before pagination in the last search"
    );

    // Catalog writes
    describe_counter!(
        format!("{}_records_created_total", METRICS_PREFIX),
        Unit::Count,
        "Catalog records created"
    );

    describe_counter!(
        format!("{}_records_deleted_total", METRICS_PREFIX),
        Unit::Count,
        "Catalog records deleted"
    );

    describe_counter!(
        format!("{}_slug_collisions_total", METRICS_PREFIX),
        Unit::Count,
        "Inserts rejected because the generated slug was taken"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record one faceted search; `relation` is "articles" or "books"
pub fn record_search(duration_secs: f64, relation: &str, result_count: usize) {
    counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        "relation" => relation.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        "relation" => relation.to_string()
    )
    .record(duration_secs);

    gauge!(
        format!("{}_search_results_count", METRICS_PREFIX),
        "relation" => relation.to_string()
    )
    .set(result_count as f64);
}

pub fn record_created(resource: &str) {
    counter!(
        format!("{}_records_created_total", METRICS_PREFIX),
        "resource" => resource.to_string()
    )
    .increment(1);
}

pub fn record_deleted(resource: &str) {
    counter!(
        format!("{}_records_deleted_total", METRICS_PREFIX),
        "resource" => resource.to_string()
    )
    .increment(1);
}

pub fn record_slug_collision(resource: &str) {
    counter!(
        format!("{}_slug_collisions_total", METRICS_PREFIX),
        "resource" => resource.to_string()
    )
    .increment(1);
}
