//! Config loader — reads `~/.parley/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.parley/config.json`
//! 3. Environment variables `PARLEY_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ProviderConfig};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(load_config_from_path(&config_path))
}

fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;
    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `PARLEY_AGENT__NAME`, `PARLEY_AGENT__PROMPT_FILE`, `PARLEY_AGENT__INTRO_FILE`,
///   `PARLEY_AGENT__SESSION_ID`
/// - `PARLEY_MODEL__MODEL`, `PARLEY_MODEL__MAX_TOKENS`, `PARLEY_MODEL__TEMPERATURE`
/// - `PARLEY_PROVIDERS__<NAME>__API_KEY`, `PARLEY_PROVIDERS__<NAME>__API_BASE`
/// - `PARLEY_SESSIONS__PERSIST`, `PARLEY_SESSIONS__MAX_MESSAGES`
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("PARLEY_AGENT__NAME") {
        config.agent.name = val;
    }
    if let Ok(val) = std::env::var("PARLEY_AGENT__PROMPT_FILE") {
        config.agent.prompt_file = val;
    }
    if let Ok(val) = std::env::var("PARLEY_AGENT__INTRO_FILE") {
        config.agent.intro_file = Some(val).filter(|v| !v.is_empty());
    }
    if let Ok(val) = std::env::var("PARLEY_AGENT__SESSION_ID") {
        config.agent.session_id = Some(val);
    }

    if let Ok(val) = std::env::var("PARLEY_MODEL__MODEL") {
        config.model.model = val;
    }
    if let Ok(val) = std::env::var("PARLEY_MODEL__MAX_TOKENS") {
        if let Ok(n) = val.parse::<u32>() {
            config.model.max_tokens = n;
        }
    }
    if let Ok(val) = std::env::var("PARLEY_MODEL__TEMPERATURE") {
        if let Ok(t) = val.parse::<f64>() {
            config.model.temperature = t;
        }
    }

    apply_provider_env(&mut config.providers.ollama, "OLLAMA");
    apply_provider_env(&mut config.providers.openai, "OPENAI");
    apply_provider_env(&mut config.providers.openrouter, "OPENROUTER");
    apply_provider_env(&mut config.providers.deepseek, "DEEPSEEK");
    apply_provider_env(&mut config.providers.groq, "GROQ");
    apply_provider_env(&mut config.providers.vllm, "VLLM");

    if let Ok(val) = std::env::var("PARLEY_SESSIONS__PERSIST") {
        config.sessions.persist = val == "true" || val == "1";
    }
    if let Ok(val) = std::env::var("PARLEY_SESSIONS__MAX_MESSAGES") {
        if let Ok(n) = val.parse::<usize>() {
            config.sessions.max_messages = n;
        }
    }

    config
}

fn apply_provider_env(provider: &mut ProviderConfig, name: &str) {
    if let Ok(val) = std::env::var(format!("PARLEY_PROVIDERS__{name}__API_KEY")) {
        provider.api_key = val;
    }
    if let Ok(val) = std::env::var(format!("PARLEY_PROVIDERS__{name}__API_BASE")) {
        provider.api_base = Some(val);
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
