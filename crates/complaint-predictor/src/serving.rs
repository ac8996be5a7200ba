// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Serving layer
//!
//! Wraps a cached classifier behind a typed request/response interface. This
//! is the one caller-facing validation point: complaints must be non-empty.
//! Everything downstream of validation is delegated to the classifier.

use std::{path::Path, sync::Arc};

use shared_types::{ClassificationType, ComplaintRequest, ComplaintResponse};
use tracing::instrument;

use crate::{
    artifact::artifact_path,
    classifier::ComplaintClassifier,
    error::{PredictorError, PredictorResult},
    lm::LanguageModel,
    loader::ClassifierCache,
};

/// A classification function for one classification type
#[derive(Debug)]
pub struct ClassificationService<L> {
    classification_type: ClassificationType,
    classifier: Arc<ComplaintClassifier<L>>,
}

impl<L> Clone for ClassificationService<L> {
    fn clone(&self) -> Self {
        Self {
            classification_type: self.classification_type,
            classifier: Arc::clone(&self.classifier),
        }
    }
}

impl<L: LanguageModel> ClassificationService<L> {
    /// Build the service for a classification type, loading (or reusing) the
    /// cached classifier behind its resolved artifact path
    ///
    /// Fails with `ArtifactNotFound` if the type has never been trained;
    /// other types' services are unaffected.
    pub async fn build(
        cache: &ClassifierCache<L>,
        artifacts_dir: &Path,
        ty: ClassificationType,
    ) -> PredictorResult<Self> {
        let path = artifact_path(artifacts_dir, ty);
        let classifier = cache.get_or_load(&path, ty).await?;

        Ok(Self {
            classification_type: ty,
            classifier,
        })
    }

    /// The classification type this service answers for
    pub fn classification_type(&self) -> ClassificationType {
        self.classification_type
    }

    /// Classify one complaint
    #[instrument(skip(self, request), fields(classification_type = %self.classification_type))]
    pub async fn classify(&self, request: &ComplaintRequest) -> PredictorResult<ComplaintResponse> {
        if request.complaint.trim().is_empty() {
            return Err(PredictorError::validation("complaint text cannot be empty"));
        }

        let prediction = self.classifier.predict(&request.complaint).await?;

        Ok(ComplaintResponse {
            classification: prediction.classification,
            justification: prediction.justification,
            classification_type: self.classification_type,
        })
    }
}
