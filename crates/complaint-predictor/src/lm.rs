// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Language model abstraction
//!
//! The classifier talks to the hosted model through this trait so the
//! transport can be swapped in tests. The production implementation is
//! [`crate::openrouter::OpenRouterClient`].

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::PredictorResult;

/// A single message in a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Chat-completion transport used by the classifier
///
/// Implementations own transport policy (timeouts, retries); callers treat
/// any error as an opaque upstream failure and propagate it.
pub trait LanguageModel: Send + Sync + 'static {
    /// Run one chat completion and return the assistant's raw text
    fn complete(
        &self,
        messages: Vec<ChatMessage>,
    ) -> impl Future<Output = PredictorResult<String>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors_set_roles() {
        assert_eq!(ChatMessage::system("a").role, "system");
        assert_eq!(ChatMessage::user("b").role, "user");
        assert_eq!(ChatMessage::assistant("c").role, "assistant");
    }
}
