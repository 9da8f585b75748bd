//! Shared application state.

use draftwork_provider::ProviderConfig;
use draftwork_workspace::Workspace;
use std::sync::Arc;

/// State shared by all request handlers and sessions.
///
/// The workspace and snapshot store are shared across sessions without
/// document-level locking: concurrent writers to the same path are
/// last-write-wins, and every write still lands in history.
#[derive(Clone)]
pub struct AppState {
    /// The live document tree (owns the snapshot store).
    pub workspace: Arc<Workspace>,

    /// Generation provider configuration. Resolved into a provider per
    /// session, so a config change picks a new provider without restarting
    /// in-flight sessions.
    pub provider_config: ProviderConfig,

    /// Ceiling on rewrite selection size, in characters.
    pub max_selection_chars: usize,

    /// CORS allow-list; an empty list or a `*` entry allows any origin.
    pub allowed_origins: Vec<String>,
}

impl AppState {
    /// Create state with defaults for the tunables.
    pub fn new(workspace: Arc<Workspace>, provider_config: ProviderConfig) -> Self {
        Self {
            workspace,
            provider_config,
            max_selection_chars: draftwork_agent::DEFAULT_MAX_SELECTION_CHARS,
            allowed_origins: Vec::new(),
        }
    }
}
