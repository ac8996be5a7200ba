// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Request and response payloads for complaint classification

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::classification::ClassificationType;

/// Inbound payload for running a classification
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComplaintRequest {
    /// Raw complaint text
    #[schema(example = "I experienced severe nausea and vomiting after taking the medication.")]
    pub complaint: String,
}

impl ComplaintRequest {
    /// Create a request from complaint text
    pub fn new(complaint: impl Into<String>) -> Self {
        Self {
            complaint: complaint.into(),
        }
    }
}

/// Structured prediction response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ComplaintResponse {
    /// The predicted label
    #[schema(example = "Adverse Event")]
    pub classification: String,
    /// Brief model-produced explanation for the label
    pub justification: String,
    /// The type of classification performed
    pub classification_type: ClassificationType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_serializes_type_as_string() {
        let response = ComplaintResponse {
            classification: "Adverse Event".to_string(),
            justification: "hives and swelling after injection".to_string(),
            classification_type: ClassificationType::AePc,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["classification_type"], "ae-pc");
        assert_eq!(value["classification"], "Adverse Event");
    }
}
