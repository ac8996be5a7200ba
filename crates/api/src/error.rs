// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error handling module
//!
//! This module provides error types for server operations, including the
//! mapping from predictor failures to HTTP responses. Artifact-unavailable
//! conditions surface as 503 with the specific missing-artifact detail, so
//! operators can tell "pipeline never ran" apart from genuine server errors.

use std::net::SocketAddr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use complaint_predictor::PredictorError;
use thiserror::Error;

/// Comprehensive error types for server operations
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Network binding errors
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        /// Socket address that failed to bind
        address: SocketAddr,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server startup errors
    #[error("Server startup failed: {source}")]
    Startup {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server shutdown errors
    #[error("Server shutdown failed: {source}")]
    Shutdown {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Runtime errors during server operation
    #[error("Runtime error: {message}")]
    Runtime {
        /// Error message
        message: String,
    },

    /// A classifier route whose artifact failed to load at startup
    #[error("Classifier unavailable: {detail}")]
    ClassifierUnavailable {
        /// The captured startup failure detail
        detail: String,
    },

    /// Input validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// JSON parsing errors with detailed context
    #[error("Invalid JSON request: {message}")]
    JsonError {
        /// Detailed error message
        message: String,
    },

    /// Errors raised by the prediction stack
    #[error("Prediction error: {0}")]
    Predictor(#[from] PredictorError),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Config { .. }
            | ServerError::Bind { .. }
            | ServerError::Startup { .. }
            | ServerError::Shutdown { .. }
            | ServerError::Runtime { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::ClassifierUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::ValidationError(..) | ServerError::JsonError { .. } => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Predictor(err) => {
                if err.is_artifact_unavailable() {
                    StatusCode::SERVICE_UNAVAILABLE
                } else if err.is_config_error() {
                    StatusCode::BAD_REQUEST
                } else if err.is_upstream() {
                    // Unexpected upstream condition, not an expected degraded
                    // state
                    StatusCode::BAD_GATEWAY
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_unavailable_maps_to_503() {
        let err = ServerError::Predictor(PredictorError::artifact_not_found("/artifacts/x.json"));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let err = ServerError::ClassifierUnavailable {
            detail: "artifact missing".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn validation_maps_to_400() {
        let err = ServerError::Predictor(PredictorError::validation("complaint text cannot be empty"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = ServerError::JsonError {
            message: "bad body".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_failures_map_to_502() {
        let err = ServerError::Predictor(PredictorError::service_unavailable("provider down"));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let err = ServerError::Predictor(PredictorError::timeout(30));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }
}
