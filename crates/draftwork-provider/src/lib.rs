//! Text generation providers for draftwork.
//!
//! A provider turns a system instruction plus a user prompt into an ordered,
//! lazy stream of text fragments. Two implementations exist:
//! - [`OpenAiProvider`] — streams from an OpenAI-compatible chat completions
//!   endpoint over SSE.
//! - [`LocalProvider`] — a deterministic, offline substitute that applies
//!   instruction-keyed textual transforms. Keeps the system testable and
//!   usable without credentials.
//!
//! Selection policy: an API key in the configuration selects the network
//! provider; its absence selects the local one.

pub mod error;
pub mod local;
pub mod openai;
pub mod transform;

// Testing provider (scripted fragment sequences).
pub mod scripted;

pub use error::{ProviderError, ProviderResult};
pub use local::LocalProvider;
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use scripted::ScriptedProvider;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Options for a generation call.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Temperature for sampling.
    pub temperature: Option<f32>,
    /// Cancellation token. When cancelled, the stream stops yielding and the
    /// underlying connection is released.
    pub abort: Option<tokio_util::sync::CancellationToken>,
}

/// A stream of generated text fragments, in provider yield order.
pub type FragmentStream = BoxStream<'static, ProviderResult<String>>;

/// The capability the rewrite session depends on: given a system instruction
/// and a user prompt, produce text incrementally or fail.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Start a generation and return the fragment stream.
    ///
    /// Fragments must be yielded in generation order. Dropping the stream
    /// releases the interaction.
    async fn stream_generate(
        &self,
        system: &str,
        user: &str,
        options: GenerateOptions,
    ) -> ProviderResult<FragmentStream>;

    /// Stable identifier for logging (e.g. "openai", "local").
    fn provider_id(&self) -> &str;
}

/// A shared provider handle for dynamic dispatch.
pub type BoxedProvider = Arc<dyn GenerationProvider>;

/// Provider configuration, as consumed from the application config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key. Absence selects the deterministic local provider.
    pub api_key: Option<String>,
    /// Base URL of the chat completions API.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 90,
        }
    }
}

/// Build a provider from configuration.
///
/// The decision is made per call, so re-resolving after a credential change
/// picks up the new provider without process restart.
pub fn from_config(config: &ProviderConfig) -> BoxedProvider {
    match &config.api_key {
        Some(key) if !key.is_empty() => Arc::new(OpenAiProvider::new(OpenAiConfig {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: key.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })),
        _ => Arc::new(LocalProvider::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_selects_local_provider() {
        let provider = from_config(&ProviderConfig::default());
        assert_eq!(provider.provider_id(), "local");
    }

    #[test]
    fn test_empty_key_selects_local_provider() {
        let config = ProviderConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(from_config(&config).provider_id(), "local");
    }

    #[test]
    fn test_key_selects_openai_provider() {
        let config = ProviderConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "https://api.openai.com/v1/".to_string(),
            ..Default::default()
        };
        assert_eq!(from_config(&config).provider_id(), "openai");
    }
}
