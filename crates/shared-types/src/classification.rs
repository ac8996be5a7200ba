// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Classification type identifiers
//!
//! This module provides the closed set of triage tasks the service performs.
//! The enum is the single source of truth; string conversion happens only at
//! the API and configuration boundaries.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// The three fixed triage tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationType {
    /// Route a complaint into "Adverse Event" vs "Product Complaint"
    AePc,
    /// Assign an adverse event to a medical sub-category
    AeCategory,
    /// Assign a product complaint to a quality sub-category
    PcCategory,
}

impl ClassificationType {
    /// All classification types, in canonical order
    pub const ALL: [Self; 3] = [Self::AePc, Self::AeCategory, Self::PcCategory];

    /// Returns the canonical string form used in artifact names, routes, and
    /// log fields
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AePc => "ae-pc",
            Self::AeCategory => "ae-category",
            Self::PcCategory => "pc-category",
        }
    }

    /// Returns the dataset directory slug for this type
    pub const fn dataset_slug(self) -> &'static str {
        match self {
            Self::AePc => "ae-pc-classification",
            Self::AeCategory => "ae-category-classification",
            Self::PcCategory => "pc-category-classification",
        }
    }
}

impl fmt::Display for ClassificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known classification type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid classification type: '{value}' (valid types: ae-pc, ae-category, pc-category)")]
pub struct ParseClassificationTypeError {
    /// The rejected input
    pub value: String,
}

impl FromStr for ClassificationType {
    type Err = ParseClassificationTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ae-pc" => Ok(Self::AePc),
            "ae-category" => Ok(Self::AeCategory),
            "pc-category" => Ok(Self::PcCategory),
            other => Err(ParseClassificationTypeError {
                value: other.to_string(),
            }),
        }
    }
}
