//! Deterministic local provider.
//!
//! Applies the instruction-keyed transforms from [`crate::transform`] and
//! streams the result in fixed-size character fragments. Used whenever no
//! provider credential is configured, so the system works and tests run
//! without network access.

use crate::{transform, FragmentStream, GenerateOptions, GenerationProvider, ProviderResult};
use async_stream::try_stream;
use async_trait::async_trait;
use std::sync::OnceLock;

/// Fragment size in characters.
const CHUNK_CHARS: usize = 24;

static INSTRUCTION_REGEX: OnceLock<regex::Regex> = OnceLock::new();
static SELECTED_REGEX: OnceLock<regex::Regex> = OnceLock::new();

fn instruction_regex() -> &'static regex::Regex {
    INSTRUCTION_REGEX.get_or_init(|| {
        regex::Regex::new(r"Instruction: (.+?)\n")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

fn selected_regex() -> &'static regex::Regex {
    SELECTED_REGEX.get_or_init(|| {
        regex::Regex::new(r"(?s)Selected text:\n```text\n(.*?)\n```")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

/// Offline, deterministic text generation.
#[derive(Debug, Clone)]
pub struct LocalProvider {
    chunk_chars: usize,
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self {
            chunk_chars: CHUNK_CHARS,
        }
    }
}

impl LocalProvider {
    /// Create a provider with a custom fragment size (in characters).
    pub fn with_chunk_chars(chunk_chars: usize) -> Self {
        Self {
            chunk_chars: chunk_chars.max(1),
        }
    }

    /// Recover the instruction and selected text from the rewrite prompt.
    fn extract_fields(user: &str) -> (String, String) {
        let instruction = instruction_regex()
            .captures(user)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();
        let selected = selected_regex()
            .captures(user)
            .map(|c| c[1].to_string())
            .unwrap_or_default();
        (instruction, selected)
    }
}

#[async_trait]
impl GenerationProvider for LocalProvider {
    async fn stream_generate(
        &self,
        _system: &str,
        user: &str,
        options: GenerateOptions,
    ) -> ProviderResult<FragmentStream> {
        let (instruction, selected) = Self::extract_fields(user);
        let replacement = transform::rewrite(&instruction, &selected);
        let chunks = chunk_by_chars(&replacement, self.chunk_chars);
        let abort = options.abort;

        Ok(Box::pin(try_stream! {
            for chunk in chunks {
                if let Some(ref token) = abort {
                    if token.is_cancelled() {
                        Err(crate::ProviderError::Cancelled)?;
                    }
                }
                yield chunk;
            }
        }))
    }

    fn provider_id(&self) -> &str {
        "local"
    }
}

/// Split `text` into fragments of at most `size` characters.
fn chunk_by_chars(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
