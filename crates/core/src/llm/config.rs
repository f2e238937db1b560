//! LLM provider configuration and client factory.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::anthropic::AnthropicClient;
use super::gemini::GeminiClient;
use super::ollama::OllamaClient;
use super::types::{LlmClient, LlmError};

/// LLM provider type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// Google Gemini API.
    Gemini,
    /// Anthropic Claude API.
    Anthropic,
    /// Local Ollama instance.
    Ollama,
}

/// LLM client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider.
    pub provider: LlmProvider,
    /// Model name/identifier.
    pub model: String,
    /// API key. Usually supplied through `TRIPSCOUT_LLM__API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL (for proxies or self-hosted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum tokens for completions.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_timeout() -> u64 {
    60
}

fn default_max_tokens() -> u32 {
    2048
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Build the client for the configured provider.
pub fn create_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    let timeout = config.timeout();

    let client: Arc<dyn LlmClient> = match config.provider {
        LlmProvider::Gemini => {
            let key = hosted_key(config)?;
            let mut client = GeminiClient::new(key, &config.model).with_timeout(timeout);
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base);
            }
            Arc::new(client)
        }
        LlmProvider::Anthropic => {
            let key = hosted_key(config)?;
            let mut client = AnthropicClient::new(key, &config.model).with_timeout(timeout);
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base);
            }
            Arc::new(client)
        }
        LlmProvider::Ollama => {
            let mut client = OllamaClient::new(&config.model).with_timeout(timeout);
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base);
            }
            Arc::new(client)
        }
    };

    Ok(client)
}

/// Hosted providers need a key unless a custom base (e.g. a proxy) handles auth.
fn hosted_key(config: &LlmConfig) -> Result<String, LlmError> {
    match (&config.api_key, &config.api_base) {
        (Some(key), _) if !key.is_empty() => Ok(key.clone()),
        (_, Some(_)) => Ok(String::new()),
        _ => Err(LlmError::NotConfigured(format!(
            "{:?} requires llm.api_key",
            config.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: LlmProvider) -> LlmConfig {
        LlmConfig {
            provider,
            model: "test-model".to_string(),
            api_key: None,
            api_base: None,
            timeout_secs: 5,
            max_tokens: 512,
        }
    }

    #[test]
    fn test_create_ollama_without_key() {
        let client = create_llm_client(&config(LlmProvider::Ollama)).unwrap();
        assert_eq!(client.provider(), "ollama");
        assert_eq!(client.model(), "test-model");
    }

    #[test]
    fn test_create_gemini_requires_key() {
        let result = create_llm_client(&config(LlmProvider::Gemini));
        assert!(matches!(result, Err(LlmError::NotConfigured(_))));

        let mut with_key = config(LlmProvider::Gemini);
        with_key.api_key = Some("key".to_string());
        let client = create_llm_client(&with_key).unwrap();
        assert_eq!(client.provider(), "gemini");
    }

    #[test]
    fn test_create_anthropic_with_proxy_base() {
        let mut cfg = config(LlmProvider::Anthropic);
        cfg.api_base = Some("http://proxy:8080".to_string());
        let client = create_llm_client(&cfg).unwrap();
        assert_eq!(client.provider(), "anthropic");
    }

    #[test]
    fn test_provider_deserialize() {
        let cfg: LlmConfig = toml::from_str(
            r#"
provider = "gemini"
model = "gemini-1.5-pro-latest"
"#,
        )
        .unwrap();
        assert_eq!(cfg.provider, LlmProvider::Gemini);
        assert_eq!(cfg.timeout_secs, 60);
        assert_eq!(cfg.max_tokens, 2048);
    }
}
