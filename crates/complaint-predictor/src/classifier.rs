// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Complaint classifier wrapper
//!
//! A [`ComplaintClassifier`] binds one classification type to one compiled
//! program and a language-model transport. Instances are immutable after
//! construction; concurrent predictions on a shared instance need no
//! locking.

use std::{path::Path, sync::Arc};

use chrono::Utc;
use shared_types::ClassificationType;
use tracing::{debug, instrument};

use crate::{
    artifact::{ArtifactDocument, ArtifactMetadata, CompiledProgram},
    error::PredictorResult,
    lm::LanguageModel,
    prompt::{self, Prediction},
    taxonomy::{TaskDescriptor, classification_config, task_descriptor},
};

/// A classifier for one classification type, backed by a compiled program
#[derive(Debug)]
pub struct ComplaintClassifier<L> {
    classification_type: ClassificationType,
    descriptor: TaskDescriptor,
    program: CompiledProgram,
    lm: Arc<L>,
}

impl<L: LanguageModel> ComplaintClassifier<L> {
    /// Create a baseline (unoptimized) classifier: descriptor instructions,
    /// no demonstrations
    pub fn new(ty: ClassificationType, lm: Arc<L>) -> Self {
        let descriptor = task_descriptor(ty);
        let program = CompiledProgram {
            instructions: descriptor.instructions.clone(),
            demos: Vec::new(),
        };

        Self {
            classification_type: ty,
            descriptor,
            program,
            lm,
        }
    }

    /// Restore a classifier from a persisted artifact
    ///
    /// Fails with `ArtifactNotFound` if the file is absent and
    /// `ArtifactCorrupt` if it cannot be parsed; no re-optimization happens
    /// here.
    pub async fn from_artifact(
        path: &Path,
        ty: ClassificationType,
        lm: Arc<L>,
    ) -> PredictorResult<Self> {
        let document = ArtifactDocument::read(path).await?;

        debug!(
            path = %path.display(),
            classification_type = %ty,
            demos = document.program.demos.len(),
            "restored classifier from artifact"
        );

        Ok(Self {
            classification_type: ty,
            descriptor: task_descriptor(ty),
            program: document.program,
            lm,
        })
    }

    /// Replace the compiled program (used by the optimizer)
    pub fn with_program(mut self, program: CompiledProgram) -> Self {
        self.program = program;
        self
    }

    /// The classification type this classifier serves
    pub fn classification_type(&self) -> ClassificationType {
        self.classification_type
    }

    /// The compiled program backing this classifier
    pub fn program(&self) -> &CompiledProgram {
        &self.program
    }

    /// Classify a complaint
    ///
    /// The returned classification is expected, but not enforced, to be a
    /// member of the type's label set; malformed upstream responses yield
    /// empty fields. Upstream failures propagate unmodified.
    #[instrument(skip(self, complaint), fields(classification_type = %self.classification_type))]
    pub async fn predict(&self, complaint: &str) -> PredictorResult<Prediction> {
        let messages = prompt::assemble_messages(&self.descriptor, &self.program, complaint);
        let raw = self.lm.complete(messages).await?;
        let prediction = prompt::parse_prediction(&raw);

        debug!(
            classification = %prediction.classification,
            "prediction completed"
        );

        Ok(prediction)
    }

    /// Persist the compiled program and provenance metadata
    ///
    /// `model` records the display-normalized identity of the model the
    /// program was optimized against.
    pub async fn save(&self, path: &Path, model: Option<String>) -> PredictorResult<()> {
        let document = ArtifactDocument {
            program: self.program.clone(),
            metadata: ArtifactMetadata {
                model,
                classification_type: self.classification_type,
                classification_config: classification_config(self.classification_type).clone(),
                optimized_at: Some(Utc::now()),
            },
        };

        document.write(path).await
    }
}
