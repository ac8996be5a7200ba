// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Artifact documents and the on-disk path convention
//!
//! An artifact is the serialized output of one optimization run: the
//! compiled program (instructions plus few-shot demonstrations) and a
//! metadata section recording provenance. Artifacts are written by the
//! pipeline, read by the loader at serve time, and their metadata may be
//! patched in place by reconciliation without touching the program section.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::ClassificationType;
use tokio::fs;
use tracing::debug;

use crate::{
    error::{PredictorError, PredictorResult},
    taxonomy::ClassificationConfig,
};

/// A single few-shot demonstration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demonstration {
    /// The complaint text shown to the model
    pub complaint: String,
    /// The expected label
    pub classification: String,
    /// The explanation paired with the label
    pub justification: String,
}

/// Compiled prompt state: instructions plus selected demonstrations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledProgram {
    /// Instruction string the optimizer settled on
    pub instructions: String,
    /// Few-shot demonstrations, in prompt order
    pub demos: Vec<Demonstration>,
}

/// Provenance metadata stored alongside the compiled program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Display-normalized identity of the model the artifact was optimized
    /// against; reconciliation keeps this in sync with the serving
    /// environment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// The classification type this artifact serves
    pub classification_type: ClassificationType,
    /// Snapshot of the taxonomy entry at training time
    pub classification_config: ClassificationConfig,
    /// When the optimization run finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimized_at: Option<DateTime<Utc>>,
}

/// The persisted artifact document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDocument {
    /// Compiled prompt state
    pub program: CompiledProgram,
    /// Provenance metadata
    pub metadata: ArtifactMetadata,
}

impl ArtifactDocument {
    /// Read and parse an artifact file
    ///
    /// A missing file is `ArtifactNotFound`; an unparseable one is
    /// `ArtifactCorrupt`.
    pub async fn read(path: &Path) -> PredictorResult<Self> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PredictorError::artifact_not_found(path));
            }
            Err(e) => return Err(PredictorError::artifact_corrupt(path, e)),
        };

        serde_json::from_str(&content).map_err(|e| PredictorError::artifact_corrupt(path, e))
    }

    /// Serialize and write an artifact file, creating parent directories
    pub async fn write(&self, path: &Path) -> PredictorResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;

        debug!(path = %path.display(), "wrote classifier artifact");
        Ok(())
    }
}

/// Deterministic artifact path for a classification type
pub fn artifact_path(artifacts_dir: &Path, ty: ClassificationType) -> PathBuf {
    artifacts_dir.join(format!("complaint_classifier_{}_optimized.json", ty.as_str()))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::taxonomy::classification_config;

    fn sample_document(ty: ClassificationType) -> ArtifactDocument {
        ArtifactDocument {
            program: CompiledProgram {
                instructions: "Classify the complaint.".to_string(),
                demos: vec![Demonstration {
                    complaint: "The pen arrived cracked.".to_string(),
                    classification: "Product Complaint".to_string(),
                    justification: "Device defect, no patient harm.".to_string(),
                }],
            },
            metadata: ArtifactMetadata {
                model: Some("test/model:free".to_string()),
                classification_type: ty,
                classification_config: classification_config(ty).clone(),
                optimized_at: None,
            },
        }
    }

    #[test]
    fn path_convention_is_per_type() {
        let dir = Path::new("/srv/artifacts");
        assert_eq!(
            artifact_path(dir, ClassificationType::AePc),
            Path::new("/srv/artifacts/complaint_classifier_ae-pc_optimized.json")
        );
        assert_eq!(
            artifact_path(dir, ClassificationType::AeCategory),
            Path::new("/srv/artifacts/complaint_classifier_ae-category_optimized.json")
        );
    }

    #[tokio::test]
    async fn write_then_read_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = artifact_path(tmp.path(), ClassificationType::AePc);

        let document = sample_document(ClassificationType::AePc);
        document.write(&path).await.unwrap();

        let loaded = ArtifactDocument::read(&path).await.unwrap();
        assert_eq!(loaded, document);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.json");

        let err = ArtifactDocument::read(&path).await.unwrap_err();
        assert!(matches!(err, PredictorError::ArtifactNotFound { .. }));
    }

    #[tokio::test]
    async fn unparseable_file_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        fs::write(&path, "{ not json").await.unwrap();

        let err = ArtifactDocument::read(&path).await.unwrap_err();
        assert!(matches!(err, PredictorError::ArtifactCorrupt { .. }));
    }
}
