//! Snapshot data structures.

use chrono::{DateTime, Utc};
use draftwork_util::{new_id, IdPrefix};
use serde::{Deserialize, Serialize};

/// Unique identifier for a snapshot.
///
/// Ids are prefixed ULIDs (`snp_...`): globally unique, assigned once at
/// creation time and lexically ordered by creation instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnapshotId(pub String);

impl SnapshotId {
    /// Create a new random snapshot ID.
    pub fn new() -> Self {
        Self(new_id(IdPrefix::Snapshot))
    }

    /// Create a snapshot ID from a string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata for one immutable snapshot of a document.
///
/// Content is stored separately under the snapshot id; two snapshots with
/// identical content still get distinct ids and distinct storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMeta {
    /// Unique identifier for this snapshot.
    pub id: SnapshotId,

    /// Logical document path the snapshot was taken for.
    pub path: String,

    /// When the snapshot was created.
    pub created_at: DateTime<Utc>,

    /// Why the snapshot was taken (e.g. "save", "create", "revert:<id>").
    pub reason: String,

    /// Who triggered the write.
    pub actor: String,

    /// Content size in bytes.
    pub size_bytes: u64,
}

impl SnapshotMeta {
    /// Create metadata for a new snapshot of `content`.
    pub fn new(
        path: impl Into<String>,
        content: &str,
        reason: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            id: SnapshotId::new(),
            path: path.into(),
            created_at: Utc::now(),
            reason: reason.into(),
            actor: actor.into(),
            size_bytes: content.len() as u64,
        }
    }
}
