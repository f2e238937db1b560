//! LLM client abstraction and implementations.
//!
//! Pipelines and planning helpers talk to a language model through the
//! [`LlmClient`] trait. Hosted Gemini and Anthropic APIs and a local Ollama
//! server are supported; [`create_llm_client`] picks one from config.

mod anthropic;
mod config;
mod gemini;
mod ollama;
mod types;

pub use anthropic::AnthropicClient;
pub use config::{create_llm_client, LlmConfig, LlmProvider};
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use types::{
    parse_json_reply, strip_code_fences, CompletionRequest, CompletionResponse, LlmClient,
    LlmError, LlmUsage,
};
