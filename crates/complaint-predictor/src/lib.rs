// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! LLM-backed complaint classification with optimized prompt artifacts
//!
//! This crate routes free-text drug-safety complaints through prompt-compiled
//! classifiers. A classifier is restored from a persisted artifact (compiled
//! instructions plus few-shot demonstrations, produced by the offline
//! optimization pipeline), cached for the life of the process, and exposed
//! behind a typed serving interface.
//!
//! # Architecture
//!
//! - [`taxonomy`]: static classification taxonomies and task descriptors
//! - [`artifact`]: artifact documents and the on-disk path convention
//! - [`classifier`]: the classifier wrapper around a compiled program
//! - [`prompt`]: prompt assembly and fielded-response parsing
//! - [`openrouter`]: chat-completions transport with retry
//! - [`loader`]: the per-key memoizing cache and artifact loader
//! - `reconcile`: best-effort artifact metadata reconciliation
//! - [`serving`]: typed request → response classification services
//! - [`config`]: settings resolved once at startup
//! - [`error`]: the error taxonomy
//!
//! # Example
//!
//! ```rust,no_run
//! use std::{path::Path, sync::Arc};
//!
//! use complaint_predictor::{
//!     ClassificationService, ClassifierCache, ClassifierLoader, LlmSettings, OpenRouterClient,
//!     ReconcileOptions,
//! };
//! use shared_types::{ClassificationType, ComplaintRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = LlmSettings::from_env()?;
//! let client = Arc::new(OpenRouterClient::new(&settings)?);
//!
//! let reconcile = ReconcileOptions::resolve(false, Some(settings.display_model_name()));
//! let cache = ClassifierCache::new(ClassifierLoader::new(client, reconcile));
//!
//! let service =
//!     ClassificationService::build(&cache, Path::new("artifacts"), ClassificationType::AePc)
//!         .await?;
//! let response = service
//!     .classify(&ComplaintRequest::new(
//!         "I experienced severe nausea after the second dose.",
//!     ))
//!     .await?;
//!
//! println!("{}: {}", response.classification, response.justification);
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod classifier;
pub mod config;
pub mod error;
pub mod lm;
pub mod loader;
pub mod openrouter;
pub mod prompt;
mod reconcile;
pub mod serving;
pub mod taxonomy;

// Re-export main types for convenience
pub use artifact::{ArtifactDocument, ArtifactMetadata, CompiledProgram, Demonstration, artifact_path};
pub use classifier::ComplaintClassifier;
pub use config::{LlmProvider, LlmSettings, ReconcileOptions};
pub use error::{PredictorError, PredictorResult};
pub use lm::{ChatMessage, LanguageModel};
pub use loader::{ClassifierCache, ClassifierLoader};
pub use openrouter::OpenRouterClient;
pub use prompt::Prediction;
pub use serving::ClassificationService;
pub use taxonomy::{ClassificationConfig, TaskDescriptor, classification_config, task_descriptor};
