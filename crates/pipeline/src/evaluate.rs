// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Classifier evaluation against labeled datasets

use anyhow::Result;
use complaint_predictor::{ComplaintClassifier, LanguageModel, Prediction};
use tracing::{debug, info};

use crate::dataset::LabeledComplaint;

/// Whether a prediction matches the ground-truth label
///
/// Comparison is trimmed and case-insensitive; anything else (including an
/// empty prediction) counts as a miss.
pub fn classification_metric(prediction: &Prediction, label: &str) -> bool {
    prediction
        .classification
        .trim()
        .eq_ignore_ascii_case(label.trim())
}

/// Evaluate a classifier on a dataset and log per-example outcomes
///
/// Upstream prediction failures abort the evaluation; the pipeline has no
/// use for a partial accuracy number.
pub async fn evaluate_model<L: LanguageModel>(
    classifier: &ComplaintClassifier<L>,
    dataset: &[LabeledComplaint],
    dataset_name: &str,
) -> Result<f64> {
    let total = dataset.len();
    let mut correct = 0usize;

    info!(dataset = dataset_name, examples = total, "evaluating classifier");

    for (i, example) in dataset.iter().enumerate() {
        let prediction = classifier.predict(&example.complaint).await?;
        let is_correct = classification_metric(&prediction, &example.label);
        if is_correct {
            correct += 1;
        }

        debug!(
            example = i + 1,
            total,
            predicted = %prediction.classification,
            actual = %example.label,
            correct = is_correct,
            "evaluated example"
        );
    }

    #[allow(clippy::cast_precision_loss)]
    let accuracy = if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    };

    info!(
        dataset = dataset_name,
        correct,
        total,
        accuracy = %format!("{:.1}%", accuracy * 100.0),
        "evaluation complete"
    );

    Ok(accuracy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(classification: &str) -> Prediction {
        Prediction {
            classification: classification.to_string(),
            justification: String::new(),
        }
    }

    #[test]
    fn metric_is_case_insensitive_and_trimmed() {
        assert!(classification_metric(
            &prediction("  adverse event "),
            "Adverse Event"
        ));
        assert!(!classification_metric(
            &prediction("Product Complaint"),
            "Adverse Event"
        ));
    }

    #[test]
    fn empty_prediction_is_a_miss() {
        assert!(!classification_metric(&prediction(""), "Adverse Event"));
    }
}
