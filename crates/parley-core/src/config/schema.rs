//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentConfig`, `ModelConfig`, `ProvidersConfig`,
//! `SessionsConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.parley/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentConfig,
    pub model: ModelConfig,
    pub providers: ProvidersConfig,
    pub sessions: SessionsConfig,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Which prompt and intro files the CLI agent is built from.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// Agent name, used in log lines and as the default session id.
    pub name: String,
    /// Plain-text system prompt file.
    pub prompt_file: String,
    /// JSON intro-message file. Optional.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro_file: Option<String>,
    /// Session id override; defaults to the agent name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "Parley".to_string(),
            prompt_file: "~/.parley/prompts/parley_prompt.txt".to_string(),
            intro_file: Some("~/.parley/prompts/parley_intro.json".to_string()),
            session_id: None,
        }
    }
}

// ─────────────────────────────────────────────
// Model
// ─────────────────────────────────────────────

/// Model selection and sampling parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelConfig {
    /// Model identifier, matched against the provider registry.
    pub model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "llama3.1:8b-instruct-q8_0".to_string(),
            max_tokens: 8192,
            temperature: 0.8,
        }
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Configuration for a single LLM provider (API key, base URL, headers).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Custom API base URL (overrides provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// All provider configurations, one per supported backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub ollama: ProviderConfig,
    pub openai: ProviderConfig,
    pub openrouter: ProviderConfig,
    pub deepseek: ProviderConfig,
    pub groq: ProviderConfig,
    pub vllm: ProviderConfig,
}

impl ProvidersConfig {
    fn entries(&self) -> [(&'static str, &ProviderConfig); 6] {
        [
            ("ollama", &self.ollama),
            ("openai", &self.openai),
            ("openrouter", &self.openrouter),
            ("deepseek", &self.deepseek),
            ("groq", &self.groq),
            ("vllm", &self.vllm),
        ]
    }

    /// Get a provider config by name (e.g. `"ollama"`).
    pub fn get_by_name(&self, name: &str) -> Option<&ProviderConfig> {
        self.entries()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| c)
    }

    /// Convert to a map for use with the provider registry.
    pub fn to_map(&self) -> HashMap<String, ProviderConfig> {
        self.entries()
            .into_iter()
            .map(|(name, config)| (name.to_string(), config.clone()))
            .collect()
    }
}

// ─────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────

/// Conversation history settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionsConfig {
    /// Mirror history to `~/.parley/sessions/*.jsonl`.
    pub persist: bool,
    /// How many past turns are replayed to the model per call.
    pub max_messages: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            persist: false,
            max_messages: 50,
        }
    }
}
