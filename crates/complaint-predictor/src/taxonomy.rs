// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Classification taxonomies and task descriptors
//!
//! This module holds the static registry mapping each [`ClassificationType`]
//! to its task description and closed label set, and builds the task
//! descriptor the classifier feeds to the language model. Pure data and pure
//! functions; no I/O.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use shared_types::ClassificationType;

/// Task description plus the closed set of allowed output labels for one
/// classification type
///
/// Label order defines canonical display order only; membership, not order,
/// is semantically significant. Every label set is non-empty and
/// duplicate-free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Free-text description of the task
    pub description: String,
    /// Allowed output labels, in display order
    pub labels: Vec<String>,
}

impl ClassificationConfig {
    fn new(description: &str, labels: &[&str]) -> Self {
        Self {
            description: description.to_string(),
            labels: labels.iter().map(|l| (*l).to_string()).collect(),
        }
    }
}

static AE_PC: LazyLock<ClassificationConfig> = LazyLock::new(|| {
    ClassificationConfig::new(
        "Classify a free-text medication complaint as an Adverse Event (a patient \
         experienced a harmful or unintended reaction) or a Product Complaint (a defect \
         or quality issue with the product itself, without patient harm).",
        &["Adverse Event", "Product Complaint"],
    )
});

static AE_CATEGORY: LazyLock<ClassificationConfig> = LazyLock::new(|| {
    ClassificationConfig::new(
        "Assign an adverse event complaint to the medical category that best matches \
         the primary reaction reported.",
        &[
            "Gastrointestinal",
            "Cardiovascular",
            "Hypersensitivity",
            "Pancreatitis",
            "Thyroid",
            "Hypoglycemia",
            "Injection Site Reaction",
            "Other",
        ],
    )
});

static PC_CATEGORY: LazyLock<ClassificationConfig> = LazyLock::new(|| {
    ClassificationConfig::new(
        "Assign a product complaint to the quality category that best matches the \
         defect reported.",
        &[
            "Device Defect",
            "Packaging Defect",
            "Labeling Issue",
            "Shipping And Storage",
            "Dosage Discrepancy",
            "Contamination Or Particulates",
            "Other",
        ],
    )
});

/// Look up the taxonomy entry for a classification type
pub fn classification_config(ty: ClassificationType) -> &'static ClassificationConfig {
    match ty {
        ClassificationType::AePc => &AE_PC,
        ClassificationType::AeCategory => &AE_CATEGORY,
        ClassificationType::PcCategory => &PC_CATEGORY,
    }
}

/// Instructions and field semantics consumed by the classifier when
/// assembling prompts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// Baseline task instructions, before any optimization
    pub instructions: String,
    /// Semantics of the complaint input field
    pub complaint_description: String,
    /// Semantics of the classification output field
    pub classification_description: String,
    /// Semantics of the justification output field
    pub justification_description: String,
}

/// Compose a task descriptor from the registry entry for a type
pub fn task_descriptor(ty: ClassificationType) -> TaskDescriptor {
    let config = classification_config(ty);
    let labels = config.labels.join("', '");

    TaskDescriptor {
        instructions: config.description.clone(),
        complaint_description: "The complaint text about the medication".to_string(),
        classification_description: format!("One of: '{labels}'"),
        justification_description: "Brief explanation for the classification".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_type_has_a_config() {
        for ty in ClassificationType::ALL {
            let config = classification_config(ty);
            assert!(!config.description.is_empty());
            assert!(!config.labels.is_empty());
        }
    }

    #[test]
    fn label_sets_have_no_duplicates() {
        for ty in ClassificationType::ALL {
            let labels = &classification_config(ty).labels;
            let unique: HashSet<&String> = labels.iter().collect();
            assert_eq!(unique.len(), labels.len(), "duplicate label for {ty}");
        }
    }

    #[test]
    fn ae_pc_labels_are_the_two_routes() {
        let labels = &classification_config(ClassificationType::AePc).labels;
        assert_eq!(labels, &["Adverse Event", "Product Complaint"]);
    }

    #[test]
    fn descriptor_enumerates_labels() {
        let descriptor = task_descriptor(ClassificationType::AePc);
        assert!(descriptor.classification_description.contains("'Adverse Event'"));
        assert!(
            descriptor
                .classification_description
                .contains("'Product Complaint'")
        );
    }

    #[test]
    fn descriptor_is_deterministic() {
        assert_eq!(
            task_descriptor(ClassificationType::PcCategory),
            task_descriptor(ClassificationType::PcCategory)
        );
    }
}
