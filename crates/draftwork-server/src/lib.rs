//! HTTP server for draftwork.
//!
//! Provides the REST API for documents, snapshots and export, plus the
//! WebSocket endpoint that streams rewrite sessions.

pub mod routes;
pub mod state;
pub mod ws;

pub use routes::create_router;
pub use state::AppState;
