//! OpenAI-compatible chat completions provider.
//!
//! Streams fragments from the `/chat/completions` SSE endpoint. Any server
//! speaking the OpenAI wire format works; the base URL is configurable.

use crate::{FragmentStream, GenerateOptions, GenerationProvider, ProviderError, ProviderResult};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Configuration for the OpenAI-compatible provider.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL without trailing slash, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Bearer token.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Streaming client for OpenAI-compatible chat completions.
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Create a new provider from configuration.
    pub fn new(config: OpenAiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    /// Parse the SSE response body into a fragment stream.
    fn parse_stream(
        response: reqwest::Response,
        abort: Option<tokio_util::sync::CancellationToken>,
    ) -> FragmentStream {
        Box::pin(try_stream! {
            let mut stream = response.bytes_stream();
            let mut buffer = String::new();

            'outer: while let Some(chunk) = stream.next().await {
                if let Some(ref token) = abort {
                    if token.is_cancelled() {
                        Err(ProviderError::Cancelled)?;
                    }
                }

                let chunk = chunk.map_err(ProviderError::RequestFailed)?;
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(data) = extract_sse_data(&mut buffer) {
                    if data == "[DONE]" {
                        break 'outer;
                    }
                    if let Some(delta) = parse_content_delta(&data) {
                        if !delta.is_empty() {
                            yield delta;
                        }
                    }
                }
            }
        })
    }
}

#[async_trait]
impl GenerationProvider for OpenAiProvider {
    async fn stream_generate(
        &self,
        system: &str,
        user: &str,
        options: GenerateOptions,
    ) -> ProviderResult<FragmentStream> {
        let url = url::Url::parse(&format!("{}/chat/completions", self.config.base_url))?;
        let payload = json!({
            "model": self.config.model,
            "stream": true,
            "temperature": options.temperature.unwrap_or(0.4),
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::api_error(status.as_u16(), body));
        }

        Ok(Self::parse_stream(response, options.abort))
    }

    fn provider_id(&self) -> &str {
        "openai"
    }
}

/// Extract the next complete `data:` payload from the SSE buffer.
///
/// Events are delimited by a blank line; fields other than `data` are
/// ignored.
fn extract_sse_data(buffer: &mut String) -> Option<String> {
    loop {
        let end = buffer.find("\n\n")?;
        let event_str = buffer[..end].to_string();
        buffer.drain(..end + 2);

        for line in event_str.lines() {
            if let Some(data) = line.strip_prefix("data:") {
                return Some(data.trim().to_string());
            }
        }
        // Comment or keep-alive event; keep scanning.
    }
}

/// Pull the content delta out of one chat completion chunk.
///
/// Malformed chunks are skipped rather than failing the stream; the
/// terminal chunk carries no delta and parses to `None`.
fn parse_content_delta(data: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct Chunk {
        choices: Vec<Choice>,
    }
    #[derive(Deserialize)]
    struct Choice {
        delta: Delta,
    }
    #[derive(Deserialize)]
    struct Delta {
        content: Option<String>,
    }

    match serde_json::from_str::<Chunk>(data) {
        Ok(chunk) => chunk.choices.into_iter().next().and_then(|c| c.delta.content),
        Err(e) => {
            debug!("Skipping unparseable SSE chunk: {e}");
            None
        }
    }
}
