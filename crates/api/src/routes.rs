// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Routes module
//!
//! This module provides route configuration and handlers for the complaint
//! triage API server.

pub mod handlers;

use axum::{
    Router,
    routing::{get, post},
};
use handlers::{
    classify_ae_category_handler, classify_ae_pc_handler, classify_pc_category_handler,
    health_handler,
};

use crate::{
    metrics::metrics_handler,
    openapi::{openapi_spec, swagger_ui},
    state::ServerState,
};

/// Create application routes
pub fn create_routes() -> Router<ServerState> {
    // Health and metrics endpoints are kept separate for monitoring purposes
    let system_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler));

    let docs_routes = Router::new()
        .route("/api-doc/openapi.json", get(openapi_spec))
        .route("/swagger-ui", get(swagger_ui));

    let classify_routes = Router::new()
        .route("/classify/ae-pc", post(classify_ae_pc_handler))
        .route("/classify/ae-category", post(classify_ae_category_handler))
        .route("/classify/pc-category", post(classify_pc_category_handler));

    Router::new()
        .merge(system_routes)
        .merge(docs_routes)
        .merge(classify_routes)
}
