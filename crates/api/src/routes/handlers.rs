// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP request handlers module
//!
//! One classify handler per classification type, all delegating to the same
//! prediction path, plus the health endpoint. A type whose artifact failed to
//! load at startup answers 503 with the captured detail; other types are
//! unaffected.

use std::time::Instant;

use axum::{Json, extract::State, response::IntoResponse};
use shared_types::{ClassificationType, ComplaintRequest, ComplaintResponse};
use tracing::warn;

use crate::{
    error::ServerError,
    extractors::JsonExtractor,
    metrics,
    state::{HealthCheck, ServerState},
};

/// Health check endpoint handler
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    summary = "Health check endpoint",
    description = "Returns the aggregate service status plus the per-classifier availability map. The aggregate is `degraded` when any classifier's artifact failed to load at startup.",
    responses(
        (status = 200, description = "Health report", body = HealthCheck)
    )
)]
pub async fn health_handler(State(state): State<ServerState>) -> impl IntoResponse {
    Json(state.health_check())
}

/// Shared prediction path for all classify routes
async fn classify(
    state: &ServerState,
    ty: ClassificationType,
    request: &ComplaintRequest,
) -> Result<Json<ComplaintResponse>, ServerError> {
    let service = match state.service(ty) {
        Ok(service) => service,
        Err(e) => {
            metrics::inc_classification_request(ty, "unavailable");
            return Err(e);
        }
    };

    let start_time = Instant::now();
    match service.classify(request).await {
        Ok(response) => {
            metrics::inc_classification_request(ty, "ok");
            metrics::observe_prediction_duration(ty, start_time.elapsed().as_secs_f64());
            Ok(Json(response))
        }
        Err(e) => {
            warn!(classification_type = %ty, error = %e, "classification failed");
            metrics::inc_classification_request(ty, "error");
            metrics::observe_prediction_duration(ty, start_time.elapsed().as_secs_f64());
            Err(e.into())
        }
    }
}

/// Classify a complaint as Adverse Event vs Product Complaint
#[utoipa::path(
    post,
    path = "/classify/ae-pc",
    tag = "classification",
    summary = "Classify a complaint as Adverse Event or Product Complaint",
    request_body = ComplaintRequest,
    responses(
        (status = 200, description = "Classification completed", body = ComplaintResponse),
        (status = 400, description = "Empty complaint or malformed request body", body = String),
        (status = 502, description = "Upstream model failure", body = String),
        (status = 503, description = "Classifier artifact not loaded", body = String)
    )
)]
pub async fn classify_ae_pc_handler(
    State(state): State<ServerState>,
    JsonExtractor(request): JsonExtractor<ComplaintRequest>,
) -> Result<Json<ComplaintResponse>, ServerError> {
    classify(&state, ClassificationType::AePc, &request).await
}

/// Classify an adverse event complaint into a medical category
#[utoipa::path(
    post,
    path = "/classify/ae-category",
    tag = "classification",
    summary = "Classify an adverse event into a medical category",
    request_body = ComplaintRequest,
    responses(
        (status = 200, description = "Classification completed", body = ComplaintResponse),
        (status = 400, description = "Empty complaint or malformed request body", body = String),
        (status = 502, description = "Upstream model failure", body = String),
        (status = 503, description = "Classifier artifact not loaded", body = String)
    )
)]
pub async fn classify_ae_category_handler(
    State(state): State<ServerState>,
    JsonExtractor(request): JsonExtractor<ComplaintRequest>,
) -> Result<Json<ComplaintResponse>, ServerError> {
    classify(&state, ClassificationType::AeCategory, &request).await
}

/// Classify a product complaint into a quality category
#[utoipa::path(
    post,
    path = "/classify/pc-category",
    tag = "classification",
    summary = "Classify a product complaint into a quality category",
    request_body = ComplaintRequest,
    responses(
        (status = 200, description = "Classification completed", body = ComplaintResponse),
        (status = 400, description = "Empty complaint or malformed request body", body = String),
        (status = 502, description = "Upstream model failure", body = String),
        (status = 503, description = "Classifier artifact not loaded", body = String)
    )
)]
pub async fn classify_pc_category_handler(
    State(state): State<ServerState>,
    JsonExtractor(request): JsonExtractor<ComplaintRequest>,
) -> Result<Json<ComplaintResponse>, ServerError> {
    classify(&state, ClassificationType::PcCategory, &request).await
}
