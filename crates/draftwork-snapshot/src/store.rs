//! Snapshot storage implementation.

use crate::{SnapshotError, SnapshotId, SnapshotMeta, SnapshotResult};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info, warn};

/// Durable, append-only storage for document snapshots.
///
/// Layout:
/// ```text
/// base_dir/
///   snapshots/
///     <snapshot_id>/
///       content.md       # Full document content
///       metadata.json    # Snapshot metadata, written last (commit point)
/// ```
///
/// Each snapshot commits into its own directory and the metadata file is
/// renamed into place after the content, so a create is observable only
/// once complete and concurrent creates never interleave.
pub struct SnapshotStore {
    /// Base directory for snapshot storage.
    base_dir: PathBuf,
}

impl SnapshotStore {
    /// Create a new snapshot store rooted at `base_dir`.
    pub async fn new(base_dir: PathBuf) -> SnapshotResult<Self> {
        fs::create_dir_all(base_dir.join("snapshots")).await?;
        Ok(Self { base_dir })
    }

    /// Record a new snapshot of `content` for `path`.
    ///
    /// Allocates a fresh id, persists the content under it, then commits the
    /// metadata row. Fails only on underlying storage I/O.
    pub async fn create(
        &self,
        path: &str,
        content: &str,
        reason: &str,
        actor: &str,
    ) -> SnapshotResult<SnapshotMeta> {
        let meta = SnapshotMeta::new(path, content, reason, actor);
        let snapshot_dir = self.snapshot_dir(&meta.id);
        fs::create_dir_all(&snapshot_dir).await?;

        write_atomic(&snapshot_dir.join("content.md"), content).await?;

        // Metadata last: its presence marks the snapshot as committed.
        let metadata_json = serde_json::to_string_pretty(&meta)?;
        write_atomic(&snapshot_dir.join("metadata.json"), &metadata_json).await?;

        info!(
            id = %meta.id,
            path = %meta.path,
            size_bytes = meta.size_bytes,
            "Created snapshot"
        );

        Ok(meta)
    }

    /// Get snapshot metadata by id.
    pub async fn get(&self, id: &SnapshotId) -> SnapshotResult<SnapshotMeta> {
        let metadata_path = self.snapshot_dir(id).join("metadata.json");

        let metadata_json = match fs::read_to_string(&metadata_path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SnapshotError::not_found(id.as_str()));
            }
            Err(e) => return Err(SnapshotError::Io(e)),
        };

        let meta: SnapshotMeta = serde_json::from_str(&metadata_json)?;
        Ok(meta)
    }

    /// Get the stored content for a snapshot.
    pub async fn content(&self, id: &SnapshotId) -> SnapshotResult<String> {
        // Metadata presence is the commit point; a content file without it
        // is an aborted create and must stay invisible.
        let meta = self.get(id).await?;

        let content_path = self.snapshot_dir(&meta.id).join("content.md");
        match fs::read_to_string(&content_path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SnapshotError::corrupted(
                format!("snapshot {id} has metadata but no content"),
            )),
            Err(e) => Err(SnapshotError::Io(e)),
        }
    }

    /// List snapshots for a document path, newest first, truncated to `limit`.
    ///
    /// Returns an empty list when the path has no history. Content is not
    /// included; fetch it per snapshot via [`SnapshotStore::content`].
    pub async fn list(&self, path: &str, limit: usize) -> SnapshotResult<Vec<SnapshotMeta>> {
        let snapshots_dir = self.base_dir.join("snapshots");
        let mut snapshots = Vec::new();

        let mut entries = fs::read_dir(&snapshots_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let id = SnapshotId::from_string(entry.file_name().to_string_lossy().to_string());
            match self.get(&id).await {
                Ok(meta) if meta.path == path => snapshots.push(meta),
                Ok(_) => {}
                // Uncommitted or damaged entries are skipped, not fatal.
                Err(e) => debug!(id = %id, "Skipping unreadable snapshot: {e}"),
            }
        }

        // Newest first; ULID ids break created_at ties in creation order.
        snapshots.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        snapshots.truncate(limit);

        Ok(snapshots)
    }
}

impl SnapshotStore {
    fn snapshot_dir(&self, id: &SnapshotId) -> PathBuf {
        self.base_dir.join("snapshots").join(id.as_str())
    }
}

/// Write a file atomically: write to a temp sibling, then rename into place.
async fn write_atomic(path: &std::path::Path, content: &str) -> SnapshotResult<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).await?;
    if let Err(e) = fs::rename(&temp_path, path).await {
        warn!(path = %path.display(), "Atomic rename failed: {e}");
        return Err(SnapshotError::Io(e));
    }
    Ok(())
}
