//! Live document tree for draftwork.
//!
//! The workspace owns the mutable "current" contents of every document and
//! writes through the snapshot store: no write is visible without a
//! corresponding history entry. Paths are logical identifiers validated
//! against a single workspace root before any filesystem access.

mod error;
mod path;
mod workspace;

pub use error::{WorkspaceError, WorkspaceResult};
pub use path::{resolve_document_path, DOCUMENT_EXTENSION};
pub use workspace::{DocumentInfo, Workspace};
