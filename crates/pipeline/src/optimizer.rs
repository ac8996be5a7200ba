// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Bootstrap few-shot optimization
//!
//! The optimizer runs the current classifier over the training split and
//! keeps the examples it answers correctly as demonstrations, paired with the
//! model's own justifications. Remaining demo slots are filled with labeled
//! examples straight from the dataset. The compiled program is the baseline
//! instruction string plus the selected demonstrations.

use anyhow::Result;
use complaint_predictor::{ComplaintClassifier, CompiledProgram, Demonstration, LanguageModel};
use tracing::{debug, info};

use crate::{dataset::LabeledComplaint, evaluate::classification_metric};

/// Bootstrap few-shot demo selection
#[derive(Debug, Clone)]
pub struct BootstrapFewShot {
    /// Demos bootstrapped from correct model predictions
    pub max_bootstrapped_demos: usize,
    /// Additional demos taken verbatim from the labeled dataset
    pub max_labeled_demos: usize,
}

impl Default for BootstrapFewShot {
    fn default() -> Self {
        Self {
            max_bootstrapped_demos: 3,
            max_labeled_demos: 4,
        }
    }
}

impl BootstrapFewShot {
    /// Compile a classifier against a training split
    ///
    /// Returns the classifier rebound to the optimized program. Upstream
    /// failures during bootstrapping propagate; a partial demo set is not
    /// worth persisting.
    pub async fn compile<L: LanguageModel>(
        &self,
        classifier: ComplaintClassifier<L>,
        trainset: &[LabeledComplaint],
    ) -> Result<ComplaintClassifier<L>> {
        let mut demos: Vec<Demonstration> = Vec::new();
        let mut used: Vec<&str> = Vec::new();

        for example in trainset {
            if demos.len() >= self.max_bootstrapped_demos {
                break;
            }

            let prediction = classifier.predict(&example.complaint).await?;
            if classification_metric(&prediction, &example.label) {
                debug!(label = %example.label, "bootstrapped demo from correct prediction");
                used.push(example.complaint.as_str());
                demos.push(Demonstration {
                    complaint: example.complaint.clone(),
                    classification: example.label.clone(),
                    justification: prediction.justification,
                });
            }
        }
        let bootstrapped = demos.len();

        // Fill remaining slots with labeled examples, annotator reasoning as
        // the justification.
        for example in trainset {
            if demos.len() >= bootstrapped + self.max_labeled_demos {
                break;
            }
            if used.contains(&example.complaint.as_str()) {
                continue;
            }
            demos.push(Demonstration {
                complaint: example.complaint.clone(),
                classification: example.label.clone(),
                justification: example.reasoning.clone().unwrap_or_default(),
            });
        }

        info!(
            bootstrapped,
            labeled = demos.len() - bootstrapped,
            "compiled program"
        );

        let program = CompiledProgram {
            instructions: classifier.program().instructions.clone(),
            demos,
        };
        Ok(classifier.with_program(program))
    }
}
