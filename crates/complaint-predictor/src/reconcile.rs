// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Artifact metadata reconciliation
//!
//! Artifacts are produced by an expensive offline optimization run tied to
//! whatever model was active at training time. When the serving environment
//! is later pointed at a different model, the artifact's recorded
//! `metadata.model` goes stale. Reconciliation patches that one field in
//! place so provenance stays truthful without re-running optimization.
//!
//! This is bookkeeping, not a correctness path: every failure is folded into
//! a [`ReconcileOutcome`] and logged at debug level. Reconciliation never
//! fails a load and never touches the program section.

use std::{fmt, path::Path};

use serde_json::{Map, Value};
use tokio::fs;

use crate::config::ReconcileOptions;

/// What a reconciliation attempt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReconcileOutcome {
    /// The auto-update gate is off
    Disabled,
    /// No model identity is configured to compare against
    NoIdentity,
    /// The recorded model already matches; no write happened
    Unchanged,
    /// `metadata.model` was rewritten to the current identity
    Updated {
        /// The previously recorded identity, if any
        previous: Option<String>,
    },
    /// An I/O or parse failure was swallowed
    Skipped {
        /// What went wrong
        reason: String,
    },
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("disabled"),
            Self::NoIdentity => f.write_str("no model identity configured"),
            Self::Unchanged => f.write_str("recorded model already current"),
            Self::Updated { previous } => {
                write!(f, "updated (previous: {})", previous.as_deref().unwrap_or("none"))
            }
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
        }
    }
}

/// Reconcile the artifact's recorded model identity with the environment's
///
/// The file is re-parsed independently of the program deserialization; only
/// `metadata.model` may change, and the replacement is atomic (temp sibling
/// plus rename) so a crash mid-write cannot corrupt the artifact.
pub(crate) async fn reconcile_model_metadata(
    path: &Path,
    options: &ReconcileOptions,
) -> ReconcileOutcome {
    if !options.auto_update {
        return ReconcileOutcome::Disabled;
    }
    let Some(identity) = options.model_identity.as_deref() else {
        return ReconcileOutcome::NoIdentity;
    };

    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            return ReconcileOutcome::Skipped {
                reason: format!("read failed: {e}"),
            };
        }
    };

    let mut document: Value = match serde_json::from_str(&content) {
        Ok(document) => document,
        Err(e) => {
            return ReconcileOutcome::Skipped {
                reason: format!("parse failed: {e}"),
            };
        }
    };

    let recorded = document
        .get("metadata")
        .and_then(|m| m.get("model"))
        .and_then(Value::as_str);

    if recorded == Some(identity) {
        return ReconcileOutcome::Unchanged;
    }
    let previous = recorded.map(ToString::to_string);

    let Some(root) = document.as_object_mut() else {
        return ReconcileOutcome::Skipped {
            reason: "artifact root is not a JSON object".to_string(),
        };
    };
    let metadata = root
        .entry("metadata")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(metadata) = metadata.as_object_mut() else {
        return ReconcileOutcome::Skipped {
            reason: "metadata section is not a JSON object".to_string(),
        };
    };
    metadata.insert("model".to_string(), Value::String(identity.to_string()));

    let serialized = match serde_json::to_string_pretty(&document) {
        Ok(serialized) => serialized,
        Err(e) => {
            return ReconcileOutcome::Skipped {
                reason: format!("serialize failed: {e}"),
            };
        }
    };

    if let Err(e) = atomic_replace(path, &serialized).await {
        return ReconcileOutcome::Skipped {
            reason: format!("write failed: {e}"),
        };
    }

    ReconcileOutcome::Updated { previous }
}

/// Write to a temporary sibling, then rename over the original
async fn atomic_replace(path: &Path, content: &str) -> std::io::Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, content).await?;
    fs::rename(&tmp_path, path).await
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn fixture_artifact() -> Value {
        serde_json::json!({
            "program": {
                "instructions": "Classify the complaint.",
                "demos": [
                    {
                        "complaint": "The pen leaked.",
                        "classification": "Product Complaint",
                        "justification": "Device defect."
                    }
                ]
            },
            "metadata": {
                "model": "old/model",
                "classification_type": "ae-pc",
                "classification_config": {
                    "description": "Route the complaint.",
                    "labels": ["Adverse Event", "Product Complaint"]
                }
            }
        })
    }

    async fn write_fixture(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("artifact.json");
        fs::write(&path, serde_json::to_string_pretty(&fixture_artifact()).unwrap())
            .await
            .unwrap();
        path
    }

    fn enabled(identity: &str) -> ReconcileOptions {
        ReconcileOptions {
            auto_update: true,
            model_identity: Some(identity.to_string()),
        }
    }

    #[tokio::test]
    async fn disabled_gate_never_writes() {
        let tmp = TempDir::new().unwrap();
        let path = write_fixture(&tmp).await;
        let mtime_before = fs::metadata(&path).await.unwrap().modified().unwrap();

        let options = ReconcileOptions {
            auto_update: false,
            model_identity: Some("new/model".to_string()),
        };
        let outcome = reconcile_model_metadata(&path, &options).await;

        assert_eq!(outcome, ReconcileOutcome::Disabled);
        let mtime_after = fs::metadata(&path).await.unwrap().modified().unwrap();
        assert_eq!(mtime_before, mtime_after);
    }

    #[tokio::test]
    async fn missing_identity_takes_no_action() {
        let tmp = TempDir::new().unwrap();
        let path = write_fixture(&tmp).await;

        let options = ReconcileOptions {
            auto_update: true,
            model_identity: None,
        };
        let outcome = reconcile_model_metadata(&path, &options).await;

        assert_eq!(outcome, ReconcileOutcome::NoIdentity);
    }

    #[tokio::test]
    async fn matching_identity_leaves_the_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = write_fixture(&tmp).await;
        let bytes_before = fs::read(&path).await.unwrap();
        let mtime_before = fs::metadata(&path).await.unwrap().modified().unwrap();

        let outcome = reconcile_model_metadata(&path, &enabled("old/model")).await;

        assert_eq!(outcome, ReconcileOutcome::Unchanged);
        assert_eq!(fs::read(&path).await.unwrap(), bytes_before);
        assert_eq!(
            fs::metadata(&path).await.unwrap().modified().unwrap(),
            mtime_before
        );
    }

    #[tokio::test]
    async fn differing_identity_updates_only_the_model_field() {
        let tmp = TempDir::new().unwrap();
        let path = write_fixture(&tmp).await;

        let outcome = reconcile_model_metadata(&path, &enabled("new/model")).await;
        assert_eq!(
            outcome,
            ReconcileOutcome::Updated {
                previous: Some("old/model".to_string())
            }
        );

        let updated: Value =
            serde_json::from_str(&fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(updated["metadata"]["model"], "new/model");

        // Everything except metadata.model survives byte-for-byte through
        // parse/compare.
        let mut expected = fixture_artifact();
        expected["metadata"]["model"] = Value::String("new/model".to_string());
        assert_eq!(updated, expected);
    }

    #[tokio::test]
    async fn absent_model_field_is_filled_in() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("artifact.json");
        let mut document = fixture_artifact();
        document["metadata"]
            .as_object_mut()
            .unwrap()
            .remove("model");
        fs::write(&path, serde_json::to_string_pretty(&document).unwrap())
            .await
            .unwrap();

        let outcome = reconcile_model_metadata(&path, &enabled("new/model")).await;
        assert_eq!(outcome, ReconcileOutcome::Updated { previous: None });

        let updated: Value =
            serde_json::from_str(&fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(updated["metadata"]["model"], "new/model");
    }

    #[tokio::test]
    async fn io_failures_are_swallowed() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("never-written.json");

        let outcome = reconcile_model_metadata(&missing, &enabled("new/model")).await;
        assert!(matches!(outcome, ReconcileOutcome::Skipped { .. }));
    }

    #[tokio::test]
    async fn unparseable_artifact_is_skipped_not_clobbered() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        fs::write(&path, "{ not json").await.unwrap();

        let outcome = reconcile_model_metadata(&path, &enabled("new/model")).await;
        assert!(matches!(outcome, ReconcileOutcome::Skipped { .. }));
        assert_eq!(fs::read_to_string(&path).await.unwrap(), "{ not json");
    }
}
