//! Edit session orchestration.

use crate::prompt::{build_user_prompt, SYSTEM_PROMPT};
use draftwork_provider::{BoxedProvider, GenerateOptions};
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default ceiling on selection size, in characters.
pub const DEFAULT_MAX_SELECTION_CHARS: usize = 8000;

/// Maximum instruction length, in characters.
pub const MAX_INSTRUCTION_CHARS: usize = 500;

/// Errors raised before a session emits any event.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Malformed selection bounds, oversized selection, or a missing
    /// instruction. Detected before any provider call; no events are
    /// emitted and nothing is mutated.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// A half-open character range `[from, to)` within the document content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub from: usize,
    pub to: usize,
}

/// One edit request, scoped to a single session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRequest {
    /// Logical document path, echoed back in the result.
    pub path: String,
    /// Full document content the selection indexes into.
    pub content: String,
    /// Character span to rewrite.
    pub selection: Selection,
    /// What to do with the selected span.
    pub instruction: String,
}

/// Events emitted over a session's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditEvent {
    /// Informational progress message; emitted exactly once, first.
    Log { message: String },
    /// One fragment of generated replacement text, in provider yield order.
    Delta { text: String },
    /// Terminal success event.
    Result {
        path: String,
        replacement: String,
        patched_content: String,
        diff: String,
        summary: String,
    },
    /// Terminal failure event.
    Error { message: String },
}

/// Run one edit session.
///
/// Preconditions are validated synchronously before any provider call; a
/// violation returns [`AgentError::InvalidRequest`] and no events are
/// emitted. The returned stream yields one `log` event, the provider's
/// `delta` fragments in order, and exactly one terminal `result` or
/// `error`. Dropping the stream cancels the provider interaction; nothing
/// is ever persisted here.
pub fn edit_stream(
    request: EditRequest,
    provider: BoxedProvider,
    max_selection_chars: usize,
) -> Result<BoxStream<'static, EditEvent>, AgentError> {
    let split = validate(&request, max_selection_chars)?;

    let stream = async_stream::stream! {
        let token = CancellationToken::new();
        // Cancels the provider when the session is dropped mid-stream.
        let _guard = token.clone().drop_guard();

        let SplitContent { prefix, selected, suffix } = split;
        let selected_chars = selected.chars().count();

        yield EditEvent::Log {
            message: format!("Rewriting {selected_chars} selected characters"),
        };

        let user_prompt = build_user_prompt(&request.instruction, &selected);
        let options = GenerateOptions {
            abort: Some(token),
            ..Default::default()
        };

        let mut fragments = match provider
            .stream_generate(SYSTEM_PROMPT, &user_prompt, options)
            .await
        {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!(provider = provider.provider_id(), "Generation failed to start: {e}");
                yield EditEvent::Error { message: e.to_string() };
                return;
            }
        };

        let mut replacement = String::new();
        while let Some(item) = fragments.next().await {
            match item {
                Ok(delta) => {
                    replacement.push_str(&delta);
                    yield EditEvent::Delta { text: delta };
                }
                Err(e) => {
                    // A mid-stream failure still gets a terminal event; the
                    // protocol has no other way to signal it.
                    warn!(provider = provider.provider_id(), "Generation failed mid-stream: {e}");
                    yield EditEvent::Error { message: e.to_string() };
                    return;
                }
            }
        }

        let patched_content = format!("{prefix}{replacement}{suffix}");
        let diff = draftwork_diff::unified_diff(&request.content, &patched_content, &request.path);
        let summary = format!(
            "selection {} chars -> {} chars",
            selected_chars,
            replacement.chars().count()
        );

        debug!(path = %request.path, "Edit session finished");
        yield EditEvent::Result {
            path: request.path.clone(),
            replacement,
            patched_content,
            diff,
            summary,
        };
    };

    Ok(Box::pin(stream))
}

struct SplitContent {
    prefix: String,
    selected: String,
    suffix: String,
}

/// Check preconditions and split the content at the selection's character
/// offsets. Offsets index characters, not bytes, so a selection can never
/// split a UTF-8 sequence.
fn validate(request: &EditRequest, max_selection_chars: usize) -> Result<SplitContent, AgentError> {
    let Selection { from, to } = request.selection;

    if to < from {
        return Err(AgentError::InvalidRequest(
            "selection.to must be >= selection.from".to_string(),
        ));
    }

    let content_chars = request.content.chars().count();
    if from > content_chars || to > content_chars {
        return Err(AgentError::InvalidRequest(
            "selection out of range".to_string(),
        ));
    }

    if to - from > max_selection_chars {
        return Err(AgentError::InvalidRequest(format!(
            "selection too large: {} chars exceeds the {max_selection_chars} char ceiling",
            to - from
        )));
    }

    let instruction_chars = request.instruction.trim().chars().count();
    if instruction_chars == 0 {
        return Err(AgentError::InvalidRequest(
            "instruction must not be empty".to_string(),
        ));
    }
    if instruction_chars > MAX_INSTRUCTION_CHARS {
        return Err(AgentError::InvalidRequest(format!(
            "instruction too long: max {MAX_INSTRUCTION_CHARS} chars"
        )));
    }

    let mut chars = request.content.chars();
    let prefix: String = chars.by_ref().take(from).collect();
    let selected: String = chars.by_ref().take(to - from).collect();
    let suffix: String = chars.collect();

    Ok(SplitContent {
        prefix,
        selected,
        suffix,
    })
}
