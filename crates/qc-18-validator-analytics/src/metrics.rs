//! # Validator Analytics Metrics
//!
//! Prometheus metrics for the analytics endpoints.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-18-validator-analytics = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `analytics_requests_total` - Counter of requests (by operation)
//! - `analytics_request_failures_total` - Counter of failed requests (by operation, kind)
//! - `analytics_request_duration_seconds` - Histogram of request latency (by operation)
//! - `analytics_global_participation_rate` - Gauge of the last computed participation rate
//! - `analytics_missing_validators_total` - Counter of unresolvable validator identifiers

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_gauge, register_histogram_vec, register_int_counter, register_int_counter_vec,
    Gauge, HistogramVec, IntCounter, IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Requests served, labeled by operation
    pub static ref REQUESTS: IntCounterVec = register_int_counter_vec!(
        "analytics_requests_total",
        "Total number of analytics requests",
        &["operation"]
    )
    .expect("Failed to create REQUESTS metric");

    /// Failed requests, labeled by operation and error kind
    pub static ref REQUEST_FAILURES: IntCounterVec = register_int_counter_vec!(
        "analytics_request_failures_total",
        "Total number of failed analytics requests",
        &["operation", "kind"]
    )
    .expect("Failed to create REQUEST_FAILURES metric");

    /// Request latency, labeled by operation
    pub static ref REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "analytics_request_duration_seconds",
        "Analytics request latency in seconds",
        &["operation"]
    )
    .expect("Failed to create REQUEST_DURATION metric");

    /// Last computed global participation rate
    pub static ref PARTICIPATION_RATE: Gauge = register_gauge!(
        "analytics_global_participation_rate",
        "Global participation rate of the last participation request"
    )
    .expect("Failed to create PARTICIPATION_RATE metric");

    /// Validator identifiers that did not resolve
    pub static ref MISSING_VALIDATORS: IntCounter = register_int_counter!(
        "analytics_missing_validators_total",
        "Total number of unresolvable validator identifiers in performance requests"
    )
    .expect("Failed to create MISSING_VALIDATORS metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a request and its latency
#[cfg(feature = "metrics")]
pub fn record_request(operation: &str, elapsed_secs: f64) {
    REQUESTS.with_label_values(&[operation]).inc();
    REQUEST_DURATION
        .with_label_values(&[operation])
        .observe(elapsed_secs);
}

/// Record a failed request
#[cfg(feature = "metrics")]
pub fn record_failure(operation: &str, kind: &str) {
    REQUEST_FAILURES.with_label_values(&[operation, kind]).inc();
}

/// Update participation rate gauge
#[cfg(feature = "metrics")]
pub fn set_participation_rate(rate: f64) {
    PARTICIPATION_RATE.set(rate);
}

/// Record unresolvable validator identifiers
#[cfg(feature = "metrics")]
pub fn record_missing_validators(count: usize) {
    MISSING_VALIDATORS.inc_by(count as u64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_request(_operation: &str, _elapsed_secs: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_failure(_operation: &str, _kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn set_participation_rate(_rate: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_missing_validators(_count: usize) {}
