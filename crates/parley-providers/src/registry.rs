//! Provider registry — static specs for the supported LLM backends.
//!
//! Each `ProviderSpec` describes how to reach a backend: keywords for model
//! matching, the default API base, and whether an API key is required.

use std::collections::HashMap;

/// Re-export the provider config from core — single source of truth.
pub use parley_core::config::schema::ProviderConfig;

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name (e.g. `"ollama"`). Also accepted as a model prefix: `"ollama/llama3.1"`.
    pub name: &'static str,
    /// Keywords to match in model names (lowercase).
    pub keywords: &'static [&'static str],
    /// Human-readable name for logs.
    pub display_name: &'static str,
    /// Gateways serve any model and are the fallback when no direct match is configured.
    pub is_gateway: bool,
    /// Self-hosted backends; usable without an API key.
    pub is_local: bool,
    /// If the API key starts with this prefix, auto-detect this provider.
    pub detect_by_key_prefix: Option<&'static str>,
    /// Default API base URL. `None` means the standard OpenAI endpoint.
    pub default_api_base: Option<&'static str>,
}

impl ProviderSpec {
    /// Whether `config` is enough to talk to this provider.
    ///
    /// Hosted providers need a key. Local ones need an API base, unless they
    /// ship a default one (Ollama on localhost).
    pub fn is_usable(&self, config: &ProviderConfig) -> bool {
        if self.is_local {
            config.api_base.is_some() || self.default_api_base.is_some()
        } else {
            config.is_configured()
        }
    }
}

// ─────────────────────────────────────────────
// Supported providers (in matching priority order)
// ─────────────────────────────────────────────

/// Complete list of supported provider specifications, in matching priority order.
pub static PROVIDERS: &[ProviderSpec] = &[
    // OpenRouter — gateway, matched by key prefix "sk-or-"
    ProviderSpec {
        name: "openrouter",
        keywords: &["openrouter"],
        display_name: "OpenRouter",
        is_gateway: true,
        is_local: false,
        detect_by_key_prefix: Some("sk-or-"),
        default_api_base: Some("https://openrouter.ai/api/v1"),
    },
    ProviderSpec {
        name: "openai",
        keywords: &["openai", "gpt"],
        display_name: "OpenAI",
        is_gateway: false,
        is_local: false,
        detect_by_key_prefix: None,
        default_api_base: None,
    },
    ProviderSpec {
        name: "deepseek",
        keywords: &["deepseek"],
        display_name: "DeepSeek",
        is_gateway: false,
        is_local: false,
        detect_by_key_prefix: None,
        default_api_base: Some("https://api.deepseek.com/v1"),
    },
    ProviderSpec {
        name: "groq",
        keywords: &["groq"],
        display_name: "Groq",
        is_gateway: false,
        is_local: false,
        detect_by_key_prefix: None,
        default_api_base: Some("https://api.groq.com/openai/v1"),
    },
    // Ollama — local, OpenAI-compatible endpoint on the default port
    ProviderSpec {
        name: "ollama",
        keywords: &["ollama"],
        display_name: "Ollama",
        is_gateway: false,
        is_local: true,
        detect_by_key_prefix: None,
        default_api_base: Some("http://localhost:11434/v1"),
    },
    // vLLM — local, no default address
    ProviderSpec {
        name: "vllm",
        keywords: &["vllm"],
        display_name: "vLLM",
        is_gateway: false,
        is_local: true,
        detect_by_key_prefix: None,
        default_api_base: None,
    },
];

// ─────────────────────────────────────────────
// Matching functions
// ─────────────────────────────────────────────

/// Find a provider spec by matching keywords against a model name.
///
/// Skips gateways and local providers — those are fallback only.
pub fn find_by_model(model: &str) -> Option<&'static ProviderSpec> {
    let model_lower = model.to_lowercase();
    PROVIDERS.iter().find(|spec| {
        !spec.is_gateway && !spec.is_local && spec.keywords.iter().any(|kw| model_lower.contains(kw))
    })
}

/// Find a provider spec by exact name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.name == name)
}

/// Find the provider named by an explicit `"<provider>/"` model prefix.
pub fn find_by_prefix(model: &str) -> Option<&'static ProviderSpec> {
    let (prefix, _) = model.split_once('/')?;
    find_by_name(&prefix.to_lowercase())
}

/// Detect a provider from the shape of its API key.
pub fn find_by_key(api_key: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|s| {
        s.detect_by_key_prefix
            .map_or(false, |pfx| api_key.starts_with(pfx))
    })
}

/// Resolve the model name sent on the wire.
///
/// A routing prefix naming this provider (`"ollama/llama3.1"`) is stripped.
/// Gateways keep vendor prefixes (`"meta-llama/llama-3"`) since they route on them.
pub fn resolve_model_name(model: &str, spec: &ProviderSpec) -> String {
    match model.split_once('/') {
        Some((prefix, rest)) if prefix.eq_ignore_ascii_case(spec.name) => rest.to_string(),
        _ => model.to_string(),
    }
}

/// Match a model name to a usable provider.
///
/// 1. Explicit `"<provider>/"` prefix.
/// 2. Keyword match, only if that provider has an API key.
/// 3. First configured gateway.
/// 4. First usable local backend (Ollama needs no configuration at all).
pub fn match_provider(
    model: &str,
    providers: &HashMap<String, ProviderConfig>,
) -> Option<(ProviderConfig, &'static ProviderSpec)> {
    let config_for = |spec: &ProviderSpec| providers.get(spec.name).cloned().unwrap_or_default();
    let usable = |spec: &'static ProviderSpec| {
        let config = config_for(spec);
        spec.is_usable(&config).then_some((config, spec))
    };

    if let Some(spec) = find_by_prefix(model) {
        if let Some(found) = usable(spec) {
            return Some(found);
        }
    }

    if let Some(spec) = find_by_model(model) {
        if let Some(found) = usable(spec) {
            return Some(found);
        }
    }

    PROVIDERS
        .iter()
        .filter(|s| s.is_gateway)
        .chain(PROVIDERS.iter().filter(|s| s.is_local))
        .find_map(usable)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(api_key: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: api_key.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_find_by_model_gpt() {
        assert_eq!(find_by_model("gpt-4o-mini").unwrap().name, "openai");
    }

    #[test]
    fn test_find_by_model_deepseek() {
        assert_eq!(find_by_model("deepseek-chat").unwrap().name, "deepseek");
    }

    #[test]
    fn test_find_by_model_skips_local_and_gateway() {
        assert!(find_by_model("ollama-thing").is_none());
        assert!(find_by_model("openrouter-auto").is_none());
    }

    #[test]
    fn test_find_by_model_unknown() {
        assert!(find_by_model("llama3.1:8b-instruct-q8_0").is_none());
    }

    #[test]
    fn test_find_by_prefix() {
        assert_eq!(find_by_prefix("ollama/llama3.1").unwrap().name, "ollama");
        assert_eq!(find_by_prefix("Groq/llama-3.3-70b").unwrap().name, "groq");
        assert!(find_by_prefix("meta-llama/llama-3").is_none());
        assert!(find_by_prefix("llama3.1").is_none());
    }

    #[test]
    fn test_find_by_key() {
        assert_eq!(find_by_key("sk-or-abc123").unwrap().name, "openrouter");
        assert!(find_by_key("sk-regular-key").is_none());
    }

    #[test]
    fn test_resolve_model_strips_own_prefix() {
        let spec = find_by_name("ollama").unwrap();
        assert_eq!(resolve_model_name("ollama/llama3.1", spec), "llama3.1");
        assert_eq!(resolve_model_name("llama3.1:8b-instruct-q8_0", spec), "llama3.1:8b-instruct-q8_0");
    }

    #[test]
    fn test_resolve_model_gateway_keeps_vendor_prefix() {
        let spec = find_by_name("openrouter").unwrap();
        assert_eq!(resolve_model_name("meta-llama/llama-3", spec), "meta-llama/llama-3");
    }

    #[test]
    fn test_is_usable() {
        let ollama = find_by_name("ollama").unwrap();
        let vllm = find_by_name("vllm").unwrap();
        let openai = find_by_name("openai").unwrap();

        assert!(ollama.is_usable(&ProviderConfig::default()));
        assert!(!vllm.is_usable(&ProviderConfig::default()));
        assert!(vllm.is_usable(&ProviderConfig {
            api_base: Some("http://gpu:8000/v1".into()),
            ..Default::default()
        }));
        assert!(!openai.is_usable(&ProviderConfig::default()));
        assert!(openai.is_usable(&keyed("sk-1")));
    }

    #[test]
    fn test_match_provider_direct_keyword() {
        let mut providers = HashMap::new();
        providers.insert("openai".to_string(), keyed("sk-1"));
        let (_, spec) = match_provider("gpt-4o", &providers).unwrap();
        assert_eq!(spec.name, "openai");
    }

    #[test]
    fn test_match_provider_default_model_falls_back_to_ollama() {
        let providers = HashMap::new();
        let (config, spec) = match_provider("llama3.1:8b-instruct-q8_0", &providers).unwrap();
        assert_eq!(spec.name, "ollama");
        assert!(config.api_base.is_none());
    }

    #[test]
    fn test_match_provider_gateway_before_local() {
        let mut providers = HashMap::new();
        providers.insert("openrouter".to_string(), keyed("sk-or-1"));
        let (_, spec) = match_provider("llama3.1", &providers).unwrap();
        assert_eq!(spec.name, "openrouter");
    }

    #[test]
    fn test_match_provider_unconfigured_keyword_falls_through() {
        let providers = HashMap::new();
        let (_, spec) = match_provider("gpt-4o", &providers).unwrap();
        assert_eq!(spec.name, "ollama");
    }

    #[test]
    fn test_match_provider_explicit_prefix() {
        let mut providers = HashMap::new();
        providers.insert("openrouter".to_string(), keyed("sk-or-1"));
        providers.insert(
            "vllm".to_string(),
            ProviderConfig {
                api_base: Some("http://gpu:8000/v1".into()),
                ..Default::default()
            },
        );
        let (_, spec) = match_provider("vllm/qwen2.5", &providers).unwrap();
        assert_eq!(spec.name, "vllm");
    }
}
