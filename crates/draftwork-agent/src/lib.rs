//! Streaming selective-rewrite sessions.
//!
//! A session takes an edit instruction plus a character selection, streams
//! replacement text from a [`draftwork_provider::GenerationProvider`], and
//! emits an ordered event sequence: one `log`, zero or more `delta`
//! fragments, then exactly one terminal `result` or `error`.
//!
//! Sessions never persist anything. Committing the patched content is the
//! caller's separate decision through the normal workspace write path.

mod prompt;
mod session;

pub use prompt::{build_user_prompt, SYSTEM_PROMPT};
pub use session::{
    edit_stream, AgentError, EditEvent, EditRequest, Selection, DEFAULT_MAX_SELECTION_CHARS,
    MAX_INSTRUCTION_CHARS,
};
