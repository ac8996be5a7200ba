// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Labeled complaint datasets
//!
//! Datasets are JSON arrays of labeled complaints, one train and one test
//! split per classification type, laid out as
//! `<data_dir>/<type>-classification/{train,test}.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use shared_types::ClassificationType;

/// One labeled training or evaluation example
///
/// Older dataset revisions used `narrative`/`category` for the two main
/// fields; both spellings are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct LabeledComplaint {
    /// The complaint text
    #[serde(alias = "narrative")]
    pub complaint: String,
    /// The ground-truth label
    #[serde(alias = "category")]
    pub label: String,
    /// Annotator reasoning, used as the justification for labeled demos
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Training split path for a classification type
pub fn train_data_path(data_dir: &Path, ty: ClassificationType) -> PathBuf {
    data_dir.join(ty.dataset_slug()).join("train.json")
}

/// Test split path for a classification type
pub fn test_data_path(data_dir: &Path, ty: ClassificationType) -> PathBuf {
    data_dir.join(ty.dataset_slug()).join("test.json")
}

async fn load_split(path: &Path, ty: ClassificationType) -> Result<Vec<LabeledComplaint>> {
    if !path.exists() {
        bail!(
            "dataset file '{}' is missing for classification type '{ty}'; \
             run the appropriate data generation script first",
            path.display()
        );
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read dataset file '{}'", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse dataset file '{}'", path.display()))
}

/// Load the train and test splits for a classification type
pub async fn prepare_datasets(
    data_dir: &Path,
    ty: ClassificationType,
) -> Result<(Vec<LabeledComplaint>, Vec<LabeledComplaint>)> {
    let trainset = load_split(&train_data_path(data_dir, ty), ty).await?;
    let testset = load_split(&test_data_path(data_dir, ty), ty).await?;
    Ok((trainset, testset))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn paths_follow_the_type_slug() {
        let data_dir = Path::new("data");
        assert_eq!(
            train_data_path(data_dir, ClassificationType::AePc),
            Path::new("data/ae-pc-classification/train.json")
        );
        assert_eq!(
            test_data_path(data_dir, ClassificationType::PcCategory),
            Path::new("data/pc-category-classification/test.json")
        );
    }

    #[test]
    fn accepts_both_key_spellings() {
        let items: Vec<LabeledComplaint> = serde_json::from_str(
            r#"[
                {"complaint": "The pen leaked.", "label": "Product Complaint"},
                {"narrative": "Severe nausea for days.", "category": "Adverse Event",
                 "reasoning": "Patient reaction."}
            ]"#,
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].complaint, "The pen leaked.");
        assert_eq!(items[0].label, "Product Complaint");
        assert!(items[0].reasoning.is_none());
        assert_eq!(items[1].complaint, "Severe nausea for days.");
        assert_eq!(items[1].label, "Adverse Event");
        assert_eq!(items[1].reasoning.as_deref(), Some("Patient reaction."));
    }

    #[tokio::test]
    async fn missing_split_names_the_path_and_type() {
        let tmp = TempDir::new().unwrap();

        let err = prepare_datasets(tmp.path(), ClassificationType::AeCategory)
            .await
            .unwrap_err();
        let message = err.to_string();

        assert!(message.contains("ae-category"));
        assert!(message.contains("train.json"));
        assert!(message.contains("data generation"));
    }

    #[tokio::test]
    async fn loads_both_splits() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("ae-pc-classification");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("train.json"),
            r#"[{"complaint": "a", "label": "Adverse Event"}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("test.json"),
            r#"[{"complaint": "b", "label": "Product Complaint"}]"#,
        )
        .unwrap();

        let (trainset, testset) = prepare_datasets(tmp.path(), ClassificationType::AePc)
            .await
            .unwrap();
        assert_eq!(trainset.len(), 1);
        assert_eq!(testset.len(), 1);
    }
}
