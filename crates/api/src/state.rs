// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server state management module
//!
//! Shared application state for the complaint triage API server. All three
//! classification services are constructed eagerly at startup; a type whose
//! artifact is missing is captured as a startup failure instead of failing
//! the whole process, so the remaining routes keep serving.

use std::{collections::HashMap, sync::Arc};

use complaint_predictor::{
    ClassificationService, ClassifierCache, ClassifierLoader, LlmSettings, OpenRouterClient,
    ReconcileOptions,
};
use serde::{Deserialize, Serialize};
use shared_types::{ClassificationType, ClassifierStatus};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::{
    config::{Environment, ServerConfig},
    error::{ServerError, ServerResult},
};

/// Shared application state with cancellation token support
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Server configuration
    config: ServerConfig,
    /// Classification services that loaded successfully at startup
    services: Arc<HashMap<ClassificationType, ClassificationService<OpenRouterClient>>>,
    /// Per-type startup failures (missing or corrupt artifacts)
    startup_failures: Arc<HashMap<ClassificationType, String>>,
    /// Cancellation token for coordinated shutdown
    pub cancellation_token: CancellationToken,
}

impl ServerState {
    /// Construct state by eagerly building all classification services
    ///
    /// A type whose artifact is absent or corrupt is recorded as a startup
    /// failure; any other error aborts startup.
    pub async fn initialize(
        config: ServerConfig,
        llm_settings: LlmSettings,
        cancellation_token: CancellationToken,
    ) -> ServerResult<Self> {
        let client = Arc::new(OpenRouterClient::new(&llm_settings)?);
        let reconcile = ReconcileOptions::resolve(
            config.auto_update_artifacts,
            Some(llm_settings.display_model_name()),
        );
        let cache = ClassifierCache::new(ClassifierLoader::new(client, reconcile));

        let mut services = HashMap::new();
        let mut startup_failures = HashMap::new();

        for ty in ClassificationType::ALL {
            match ClassificationService::build(&cache, &config.artifacts_dir, ty).await {
                Ok(service) => {
                    info!(classification_type = %ty, "classification service ready");
                    services.insert(ty, service);
                }
                Err(e) if e.is_artifact_unavailable() => {
                    warn!(classification_type = %ty, error = %e, "classification service unavailable");
                    startup_failures.insert(ty, e.to_string());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Self {
            config,
            services: Arc::new(services),
            startup_failures: Arc::new(startup_failures),
            cancellation_token,
        })
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Look up the service for a classification type
    ///
    /// Returns `ClassifierUnavailable` carrying the captured startup failure
    /// when that type's artifact did not load.
    pub fn service(
        &self,
        ty: ClassificationType,
    ) -> ServerResult<&ClassificationService<OpenRouterClient>> {
        self.services.get(&ty).ok_or_else(|| {
            let detail = self.startup_failures.get(&ty).cloned().unwrap_or_else(|| {
                format!("classifier for '{ty}' was not initialized")
            });
            ServerError::ClassifierUnavailable { detail }
        })
    }

    /// Perform health check operations
    pub fn health_check(&self) -> HealthCheck {
        let classifiers: HashMap<String, ClassifierStatus> = ClassificationType::ALL
            .into_iter()
            .map(|ty| {
                let status = if self.services.contains_key(&ty) {
                    ClassifierStatus::Up
                } else {
                    ClassifierStatus::Down {
                        reason: self
                            .startup_failures
                            .get(&ty)
                            .cloned()
                            .unwrap_or_else(|| "not initialized".to_string()),
                    }
                };
                (ty.as_str().to_string(), status)
            })
            .collect();

        let status = if self.startup_failures.is_empty() {
            OverallStatus::Ok
        } else {
            OverallStatus::Degraded
        };

        HealthCheck {
            status,
            version: Box::from(env!("CARGO_PKG_VERSION")),
            environment: self.config.environment,
            timestamp: chrono::Utc::now().to_rfc3339(),
            classifiers,
        }
    }
}

/// Aggregate service status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    /// All classifiers loaded
    Ok,
    /// At least one classifier is unavailable
    Degraded,
}

/// Health check status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthCheck {
    /// Aggregate service status
    pub status: OverallStatus,
    /// Service version
    pub version: Box<str>,
    /// Environment
    #[schema(value_type = String)]
    pub environment: Environment,
    /// Timestamp
    pub timestamp: String,
    /// Status of each classifier route
    #[schema(value_type = Object)]
    pub classifiers: HashMap<String, ClassifierStatus>,
}
