// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Per-classifier availability reporting

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Availability of a single classifier route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ClassifierStatus {
    /// Artifact loaded, route is serving predictions
    Up,
    /// Artifact failed to load at startup; the route returns 503
    Down {
        /// Human-readable explanation, typically the missing-artifact detail
        reason: String,
    },
}

impl ClassifierStatus {
    /// Whether the classifier can serve requests
    pub fn is_available(&self) -> bool {
        matches!(self, ClassifierStatus::Up)
    }
}
