//! Append-only snapshot store for draftwork.
//!
//! Every successful document write records an immutable snapshot: metadata
//! row plus a full copy of the content, keyed by a fresh snapshot id. History
//! is never truncated; reverting a document appends a new snapshot rather
//! than rewinding.
//!
//! # Example
//!
//! ```no_run
//! use draftwork_snapshot::SnapshotStore;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SnapshotStore::new(PathBuf::from("data/snapshots")).await?;
//!
//! let meta = store.create("notes/a.md", "# Hello\n", "save", "user").await?;
//! let history = store.list("notes/a.md", 200).await?;
//! let content = store.content(&meta.id).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod snapshot;
mod store;

pub use error::{SnapshotError, SnapshotResult};
pub use snapshot::{SnapshotId, SnapshotMeta};
pub use store::SnapshotStore;
