// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for complaint prediction operations
//!
//! This module provides the error taxonomy for artifact handling, prediction,
//! and configuration. Artifact-loading failures are kept distinguishable from
//! upstream prediction failures so the API layer can report
//! service-unavailable instead of internal-error.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for prediction operations
pub type PredictorResult<T> = Result<T, PredictorError>;

/// Error types for complaint prediction operations
#[derive(Debug, Error)]
pub enum PredictorError {
    /// Unknown classification type or invalid settings
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Artifact file absent; the optimization pipeline has never run for
    /// this classification type
    #[error(
        "Classifier artifact not found: {path}. Run the optimization pipeline to produce it."
    )]
    ArtifactNotFound {
        /// The resolved artifact path that was probed
        path: PathBuf,
    },

    /// Artifact present but unreadable or unparseable
    #[error("Classifier artifact at {path} is corrupt: {message}")]
    ArtifactCorrupt {
        /// The artifact path
        path: PathBuf,
        /// Parse or read failure detail
        message: String,
    },

    /// Request failed caller-facing validation
    #[error("Validation error: {message}")]
    Validation {
        /// Error message
        message: String,
    },

    /// HTTP request to the model provider failed
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message
        message: String,
    },

    /// Provider rejected the credentials
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Error message
        message: String,
    },

    /// Provider rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimitExceeded {
        /// Suggested retry delay
        retry_after_seconds: u64,
    },

    /// Request to the provider timed out
    #[error("Request timeout after {timeout_seconds} seconds")]
    Timeout {
        /// Configured timeout
        timeout_seconds: u64,
    },

    /// Provider returned a response the client could not interpret
    #[error("Invalid response format: {message}")]
    InvalidResponse {
        /// Error message
        message: String,
    },

    /// Provider is unavailable (5xx class)
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Error message
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {message}")]
    Json {
        /// Error message
        message: String,
    },

    /// Filesystem error
    #[error("I/O error: {message}")]
    Io {
        /// Error message
        message: String,
    },
}

impl PredictorError {
    /// Create a configuration error
    pub fn config<T: ToString>(message: T) -> Self {
        Self::Configuration {
            message: message.to_string(),
        }
    }

    /// Create a missing-artifact error
    pub fn artifact_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ArtifactNotFound { path: path.into() }
    }

    /// Create a corrupt-artifact error
    pub fn artifact_corrupt(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::ArtifactCorrupt {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a validation error
    pub fn validation<T: ToString>(message: T) -> Self {
        Self::Validation {
            message: message.to_string(),
        }
    }

    /// Create an HTTP error
    pub fn http<T: ToString>(message: T) -> Self {
        Self::Http {
            message: message.to_string(),
        }
    }

    /// Create an authentication error
    pub fn authentication<T: ToString>(message: T) -> Self {
        Self::Authentication {
            message: message.to_string(),
        }
    }

    /// Create a rate limit error
    pub fn rate_limit(retry_after_seconds: u64) -> Self {
        Self::RateLimitExceeded {
            retry_after_seconds,
        }
    }

    /// Create a timeout error
    pub fn timeout(timeout_seconds: u64) -> Self {
        Self::Timeout { timeout_seconds }
    }

    /// Create an invalid response error
    pub fn invalid_response<T: ToString>(message: T) -> Self {
        Self::InvalidResponse {
            message: message.to_string(),
        }
    }

    /// Create a service unavailable error
    pub fn service_unavailable<T: ToString>(message: T) -> Self {
        Self::ServiceUnavailable {
            message: message.to_string(),
        }
    }

    /// Create a JSON error
    pub fn json<T: ToString>(message: T) -> Self {
        Self::Json {
            message: message.to_string(),
        }
    }

    /// Create an I/O error
    pub fn io<T: ToString>(message: T) -> Self {
        Self::Io {
            message: message.to_string(),
        }
    }

    /// Whether this error means the artifact is missing or unusable, i.e. the
    /// route should report service-unavailable rather than internal-error
    pub fn is_artifact_unavailable(&self) -> bool {
        matches!(
            self,
            PredictorError::ArtifactNotFound { .. } | PredictorError::ArtifactCorrupt { .. }
        )
    }

    /// Whether this error originated from the upstream model call
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            PredictorError::Http { .. }
                | PredictorError::Authentication { .. }
                | PredictorError::RateLimitExceeded { .. }
                | PredictorError::Timeout { .. }
                | PredictorError::InvalidResponse { .. }
                | PredictorError::ServiceUnavailable { .. }
        )
    }

    /// Whether this error indicates a configuration problem
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            PredictorError::Configuration { .. } | PredictorError::Validation { .. }
        )
    }
}

/// Convert from reqwest errors
impl From<reqwest::Error> for PredictorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                timeout_seconds: 30, // Default timeout assumption
            }
        } else if err.is_status() {
            let status = err.status().map(|s| s.as_u16()).unwrap_or(0);
            if status == 401 || status == 403 {
                Self::Authentication {
                    message: err.to_string(),
                }
            } else if status == 429 {
                Self::RateLimitExceeded {
                    retry_after_seconds: 60,
                }
            } else if status >= 500 {
                Self::ServiceUnavailable {
                    message: err.to_string(),
                }
            } else {
                Self::Http {
                    message: err.to_string(),
                }
            }
        } else {
            Self::Http {
                message: err.to_string(),
            }
        }
    }
}

/// Convert from JSON errors
impl From<serde_json::Error> for PredictorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

/// Convert from I/O errors
impl From<std::io::Error> for PredictorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

/// Convert from classification type parse failures
impl From<shared_types::ParseClassificationTypeError> for PredictorError {
    fn from(err: shared_types::ParseClassificationTypeError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_constructors() {
        let config_err = PredictorError::config("test message");
        assert!(matches!(config_err, PredictorError::Configuration { .. }));
        assert!(config_err.is_config_error());

        let missing = PredictorError::artifact_not_found("/tmp/a.json");
        assert!(missing.is_artifact_unavailable());
        assert!(!missing.is_upstream());

        let rate_limit_err = PredictorError::rate_limit(60);
        assert!(matches!(
            rate_limit_err,
            PredictorError::RateLimitExceeded {
                retry_after_seconds: 60
            }
        ));
    }

    #[test]
    fn upstream_classification() {
        assert!(PredictorError::timeout(30).is_upstream());
        assert!(PredictorError::invalid_response("garbage").is_upstream());
        assert!(!PredictorError::artifact_not_found("/x").is_upstream());
        assert!(!PredictorError::validation("empty complaint").is_upstream());
    }

    #[test]
    fn missing_artifact_message_names_the_pipeline() {
        let err = PredictorError::artifact_not_found("/artifacts/missing.json");
        let display = err.to_string();
        assert!(display.contains("/artifacts/missing.json"));
        assert!(display.contains("optimization pipeline"));
    }

    #[test]
    fn parse_error_maps_to_configuration() {
        let parse_err = "nope".parse::<shared_types::ClassificationType>().unwrap_err();
        let err: PredictorError = parse_err.into();
        assert!(err.is_config_error());
    }
}
