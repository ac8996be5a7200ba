// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Prompt assembly and response parsing
//!
//! A compiled program is turned into chat messages here: system instructions,
//! then one user/assistant pair per demonstration, then the complaint under
//! classification. The inverse direction parses the model's fielded response
//! back into a prediction.
//!
//! Parsing is deliberately tolerant: a truncated or malformed response yields
//! empty fields rather than an error, and label fidelity is not checked.
//! Callers must tolerate empty or out-of-taxonomy classification strings.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    artifact::{CompiledProgram, Demonstration},
    lm::ChatMessage,
    taxonomy::TaskDescriptor,
};

// Field markers are matched case-insensitively at line starts. The
// justification pattern is dot-matches-newline so multi-line explanations
// survive.
static CLASSIFICATION_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*classification:[ \t]*(.*?)[ \t]*$")
        .expect("classification field regex is valid")
});
static JUSTIFICATION_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)justification:[ \t]*(.*)").expect("justification field regex is valid")
});

/// A parsed model prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    /// The predicted label; may be empty or out-of-taxonomy on malformed
    /// upstream responses
    pub classification: String,
    /// The model's explanation for the label
    pub justification: String,
}

/// Build the system message from the task descriptor and the compiled
/// instructions
fn system_message(descriptor: &TaskDescriptor, program: &CompiledProgram) -> String {
    format!(
        "{instructions}\n\n\
         Input field `complaint`: {complaint}\n\
         Output field `classification`: {classification}\n\
         Output field `justification`: {justification}\n\n\
         Respond in exactly this format:\n\
         Classification: <label>\n\
         Justification: <brief explanation>",
        instructions = program.instructions,
        complaint = descriptor.complaint_description,
        classification = descriptor.classification_description,
        justification = descriptor.justification_description,
    )
}

/// Render a demonstration as an assistant turn
pub(crate) fn render_completion(classification: &str, justification: &str) -> String {
    format!("Classification: {classification}\nJustification: {justification}")
}

/// Assemble the full chat transcript for one prediction
pub(crate) fn assemble_messages(
    descriptor: &TaskDescriptor,
    program: &CompiledProgram,
    complaint: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2 + program.demos.len() * 2);
    messages.push(ChatMessage::system(system_message(descriptor, program)));

    for Demonstration {
        complaint,
        classification,
        justification,
    } in &program.demos
    {
        messages.push(ChatMessage::user(complaint.clone()));
        messages.push(ChatMessage::assistant(render_completion(
            classification,
            justification,
        )));
    }

    messages.push(ChatMessage::user(complaint.to_string()));
    messages
}

/// Parse the model's raw text into a prediction
pub(crate) fn parse_prediction(raw: &str) -> Prediction {
    let classification = CLASSIFICATION_FIELD
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    // The justification field trails the classification; strip a leading
    // classification line the dot-all match may have swallowed.
    let justification = JUSTIFICATION_FIELD
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    Prediction {
        classification,
        justification,
    }
}
