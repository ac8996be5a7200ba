// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Language model settings and the reconciliation policy
//!
//! Settings are resolved once at startup (defaults, then an optional
//! `llm.json` file, then `LLM_`-prefixed environment variables) and passed
//! into the components that need them. Nothing in this crate reads the
//! process environment at call time.

use std::collections::HashMap;

use config::{Config, Environment as ConfigEnv, File};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PredictorError, PredictorResult};

/// Default hosted model
pub const DEFAULT_MODEL: &str = "nvidia/nemotron-3-nano-30b-a3b:free";
/// Default model name when running against a local OpenAI-compatible server
pub const DEFAULT_LOCAL_MODEL: &str = "nemotron-3-nano-30b-a3b";
/// Default OpenRouter API base
pub const DEFAULT_OPENROUTER_BASE: &str = "https://openrouter.ai/api/v1";
/// Default local inference server base
pub const DEFAULT_LOCAL_BASE: &str = "http://localhost:8080/v1";

const DEFAULT_TIMEOUT_SECONDS: u64 = 120;
const DEFAULT_MAX_TOKENS: u32 = 8000;

/// Which kind of endpoint the model client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Hosted models behind the OpenRouter gateway
    OpenRouter,
    /// A local OpenAI-compatible inference server, no API key required
    Local,
}

/// Runtime configuration for the underlying language model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Endpoint kind
    pub provider: LlmProvider,
    /// Model identifier, possibly carrying a provider routing prefix
    pub model: String,
    /// API key; absent for local providers
    pub api_key: Option<String>,
    /// Chat-completions API base URL
    pub api_base: Url,
    /// Extra HTTP headers sent with every request (e.g. attribution headers)
    pub headers: HashMap<String, String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Completion token budget
    pub max_tokens: u32,
}

/// Raw deserialization target for the layered config sources
#[derive(Debug, Deserialize)]
struct RawLlmSettings {
    provider: LlmProvider,
    model: Option<String>,
    api_key: Option<String>,
    api_base: Option<String>,
    headers: Option<HashMap<String, String>>,
    timeout_seconds: u64,
    max_tokens: u32,
}

impl LlmSettings {
    /// Load settings from defaults, an optional `llm.json` file, and
    /// `LLM_`-prefixed environment variables (e.g. `LLM_MODEL`,
    /// `LLM_API_KEY`, `LLM_PROVIDER`)
    pub fn from_env() -> PredictorResult<Self> {
        let raw: RawLlmSettings = Config::builder()
            .set_default("provider", "openrouter")
            .map_err(PredictorError::config)?
            .set_default("timeout_seconds", DEFAULT_TIMEOUT_SECONDS as i64)
            .map_err(PredictorError::config)?
            .set_default("max_tokens", i64::from(DEFAULT_MAX_TOKENS))
            .map_err(PredictorError::config)?
            .add_source(File::with_name("llm.json").required(false))
            .add_source(ConfigEnv::with_prefix("LLM").try_parsing(true))
            .build()
            .map_err(PredictorError::config)?
            .try_deserialize()
            .map_err(PredictorError::config)?;

        Self::resolve(raw)
    }

    fn resolve(raw: RawLlmSettings) -> PredictorResult<Self> {
        let settings = match raw.provider {
            LlmProvider::Local => {
                let api_base = raw
                    .api_base
                    .unwrap_or_else(|| DEFAULT_LOCAL_BASE.to_string());
                Self {
                    provider: LlmProvider::Local,
                    model: raw.model.unwrap_or_else(|| DEFAULT_LOCAL_MODEL.to_string()),
                    api_key: None,
                    api_base: parse_base_url(&api_base)?,
                    headers: HashMap::new(),
                    timeout_seconds: raw.timeout_seconds,
                    max_tokens: raw.max_tokens,
                }
            }
            LlmProvider::OpenRouter => {
                let api_key = raw.api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
                    PredictorError::config(
                        "no API key found: set LLM_API_KEY or use LLM_PROVIDER=local",
                    )
                })?;
                let api_base = raw
                    .api_base
                    .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE.to_string());
                Self {
                    provider: LlmProvider::OpenRouter,
                    model: raw.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                    api_key: Some(api_key),
                    api_base: parse_base_url(&api_base)?,
                    headers: raw.headers.unwrap_or_default(),
                    timeout_seconds: raw.timeout_seconds,
                    max_tokens: raw.max_tokens,
                }
            }
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Validate the resolved settings
    pub fn validate(&self) -> PredictorResult<()> {
        if self.model.is_empty() {
            return Err(PredictorError::config("model name cannot be empty"));
        }
        if self.timeout_seconds == 0 || self.timeout_seconds > 600 {
            return Err(PredictorError::config(format!(
                "invalid timeout: {} seconds (must be 1-600)",
                self.timeout_seconds
            )));
        }
        if self.max_tokens == 0 {
            return Err(PredictorError::config("max_tokens must be greater than 0"));
        }
        Ok(())
    }

    /// The display-normalized model identity: the model name with any
    /// provider routing prefix stripped (`openrouter/foo` becomes `foo`)
    ///
    /// This is the identity recorded in artifact metadata and compared by
    /// reconciliation.
    pub fn display_model_name(&self) -> String {
        display_model_name(&self.model)
    }

    /// The model name sent on the wire, without a routing prefix
    pub fn wire_model_name(&self) -> &str {
        self.model
            .strip_prefix("openrouter/")
            .unwrap_or(&self.model)
    }
}

/// Strip a provider routing prefix from a model identifier
pub fn display_model_name(model: &str) -> String {
    model
        .strip_prefix("openrouter/")
        .unwrap_or(model)
        .to_string()
}

fn parse_base_url(base: &str) -> PredictorResult<Url> {
    Url::parse(base)
        .map_err(|e| PredictorError::config(format!("invalid API base URL '{base}': {e}")))
}

/// Resolved reconciliation policy passed into the loader
///
/// Constructed once at the composition root. [`ReconcileOptions::resolve`]
/// applies the test-harness override; tests exercising the write path build
/// the struct literally instead.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Whether reconciliation writes are permitted
    pub auto_update: bool,
    /// The current environment's model identity, display-normalized; `None`
    /// when no model is configured
    pub model_identity: Option<String>,
}

impl ReconcileOptions {
    /// A policy that never writes
    pub fn disabled() -> Self {
        Self {
            auto_update: false,
            model_identity: None,
        }
    }

    /// Resolve the policy from the opt-in flag and the configured model.
    /// A detected test harness forces reconciliation off regardless of the
    /// opt-in, keeping test runs side-effect-free.
    pub fn resolve(auto_update: bool, model_identity: Option<String>) -> Self {
        Self {
            auto_update: auto_update && !in_test_harness(),
            model_identity: model_identity.map(|m| display_model_name(&m)),
        }
    }
}

fn in_test_harness() -> bool {
    cfg!(test) || std::env::var_os("COMPLAINT_TRIAGE_TEST_CONTEXT").is_some()
}
