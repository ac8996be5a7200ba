// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics module
//!
//! Provides global metrics using the default Prometheus registry via macros
//! and an Axum-compatible metrics handler.

use std::sync::LazyLock;

use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use prometheus::{
    Encoder, HistogramVec, IntCounterVec, TextEncoder, register_histogram_vec,
    register_int_counter_vec,
};
use shared_types::ClassificationType;

/// Total number of classification requests, labeled by type and result.
pub static CLASSIFICATION_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "complaint_api_classification_requests_total",
        "Total number of classification requests, labeled by classification_type and result",
        &["classification_type", "result"]
    )
    .expect("Failed to create classification requests counter vec")
});

/// Histogram for prediction durations in seconds.
pub static PREDICTION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "complaint_api_prediction_duration",
        "Prediction durations in seconds",
        &["classification_type"],
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]
    )
    .expect("Failed to create prediction duration histogram")
});

/// Increment the request counter for a classification type
///
/// # Arguments
/// * `ty` - The classification type of the request
/// * `result` - The request result (ok, error, unavailable)
pub fn inc_classification_request(ty: ClassificationType, result: &str) {
    CLASSIFICATION_REQUESTS
        .with_label_values(&[ty.as_str(), result])
        .inc();
}

/// Observe the duration of one prediction
///
/// # Arguments
/// * `ty` - The classification type of the request
/// * `duration_secs` - The duration of the prediction in seconds
pub fn observe_prediction_duration(ty: ClassificationType, duration_secs: f64) {
    PREDICTION_DURATION
        .with_label_values(&[ty.as_str()])
        .observe(duration_secs);
}

/// Axum handler that exports metrics in Prometheus text format
///
/// # Panics
///
/// This function will panic if:
/// - The metrics encoder fails to encode the metrics data
/// - The UTF-8 conversion of the encoded buffer fails
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");

    let body = String::from_utf8(buffer).expect("metrics buffer should be valid UTF-8");
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        body,
    )
}
