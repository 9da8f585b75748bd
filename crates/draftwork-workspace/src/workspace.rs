//! Workspace implementation.

use crate::{resolve_document_path, WorkspaceError, WorkspaceResult, DOCUMENT_EXTENSION};
use chrono::{DateTime, Utc};
use draftwork_snapshot::{SnapshotId, SnapshotMeta, SnapshotStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Current state of one document on disk.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    /// Logical path relative to the workspace root.
    pub path: String,
    /// Size on disk in bytes.
    pub size_bytes: u64,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// The live, mutable tree of current document contents.
///
/// Every write goes through the snapshot store. The snapshot is recorded
/// first and the on-disk write follows: a crash between the two leaves an
/// extra history entry but never a visible write without history.
pub struct Workspace {
    root: PathBuf,
    store: Arc<SnapshotStore>,
}

impl Workspace {
    /// Open a workspace rooted at `root`, creating the directory if needed.
    pub async fn new(root: PathBuf, store: Arc<SnapshotStore>) -> WorkspaceResult<Self> {
        fs::create_dir_all(&root).await?;
        let root = root.canonicalize()?;
        Ok(Self { root, store })
    }

    /// The canonicalized workspace root.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// The snapshot store backing this workspace.
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.store
    }

    /// List all documents under the root, sorted by path case-insensitively.
    ///
    /// Only files with the recognized document extension are included.
    pub fn list_documents(&self) -> WorkspaceResult<Vec<DocumentInfo>> {
        let mut items = Vec::new();

        for entry in WalkDir::new(&self.root).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let is_document = entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION));
            if !is_document {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|_| WorkspaceError::invalid_path(entry.path().display().to_string()))?;
            let path = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let metadata = entry.metadata().map_err(|e| {
                WorkspaceError::Storage(std::io::Error::other(e))
            })?;
            let updated_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            items.push(DocumentInfo {
                path,
                size_bytes: metadata.len(),
                updated_at,
            });
        }

        items.sort_by_key(|d| d.path.to_lowercase());
        Ok(items)
    }

    /// Read the current content of a document.
    pub async fn read(&self, path: &str) -> WorkspaceResult<String> {
        let full = resolve_document_path(&self.root, path)?;
        match fs::read_to_string(&full).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(WorkspaceError::not_found(path))
            }
            Err(e) => Err(WorkspaceError::Storage(e)),
        }
    }

    /// Write a document, recording a snapshot of the new content.
    ///
    /// Returns the id of the snapshot that records this write.
    pub async fn write(
        &self,
        path: &str,
        content: &str,
        reason: &str,
        actor: &str,
    ) -> WorkspaceResult<SnapshotId> {
        let full = resolve_document_path(&self.root, path)?;

        // History first, then the visible write.
        let meta = self.store.create(path, content, reason, actor).await?;

        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&full, content).await?;

        debug!(path, snapshot = %meta.id, reason, "Wrote document");
        Ok(meta.id)
    }

    /// Create a new document, optionally from a template.
    ///
    /// Fails with [`WorkspaceError::AlreadyExists`] if the path already has
    /// content.
    pub async fn create(&self, path: &str, template: Option<&str>) -> WorkspaceResult<SnapshotId> {
        let full = resolve_document_path(&self.root, path)?;
        if fs::try_exists(&full).await? {
            return Err(WorkspaceError::AlreadyExists(path.to_string()));
        }

        self.write(path, template.unwrap_or(""), "create", "user")
            .await
    }

    /// Revert a document to the content of an earlier snapshot.
    ///
    /// History is append-only: this performs a normal write with reason
    /// `revert:<snapshot_id>`, so the revert itself becomes the newest
    /// entry and nothing is truncated. Fails with NotFound (and no side
    /// effects) when the snapshot id is unknown.
    pub async fn revert(
        &self,
        path: &str,
        snapshot_id: &SnapshotId,
        actor: &str,
    ) -> WorkspaceResult<SnapshotId> {
        resolve_document_path(&self.root, path)?;

        let content = self.store.content(snapshot_id).await?;
        let reason = format!("revert:{snapshot_id}");
        let new_id = self.write(path, &content, &reason, actor).await?;

        info!(path, from = %snapshot_id, to = %new_id, "Reverted document");
        Ok(new_id)
    }

    /// Snapshot history for a path, newest first.
    pub async fn list_snapshots(
        &self,
        path: &str,
        limit: usize,
    ) -> WorkspaceResult<Vec<SnapshotMeta>> {
        resolve_document_path(&self.root, path)?;
        Ok(self.store.list(path, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup_test() -> (TempDir, Workspace) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(
            SnapshotStore::new(dir.path().join("snapshots"))
                .await
                .unwrap(),
        );
        let workspace = Workspace::new(dir.path().join("workspace"), store)
            .await
            .unwrap();
        (dir, workspace)
    }

    #[tokio::test]
    async fn test_write_then_read_roundtrip() {
        let (_dir, ws) = setup_test().await;

        ws.write("a.md", "# Title\n", "save", "user").await.unwrap();
        assert_eq!(ws.read("a.md").await.unwrap(), "# Title\n");
    }

    #[tokio::test]
    async fn test_every_write_appends_history() {
        let (_dir, ws) = setup_test().await;

        for i in 0..3 {
            ws.write("a.md", &format!("v{i}"), "save", "user")
                .await
                .unwrap();
        }

        let history = ws.list_snapshots("a.md", 200).await.unwrap();
        assert_eq!(history.len(), 3);

        // Newest snapshot content matches the current read.
        let newest = ws
            .snapshots()
            .content(&history[0].id)
            .await
            .unwrap();
        assert_eq!(newest, ws.read("a.md").await.unwrap());
    }

    #[tokio::test]
    async fn test_read_missing_document_is_not_found() {
        let (_dir, ws) = setup_test().await;
        assert!(matches!(
            ws.read("missing.md").await,
            Err(WorkspaceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_nested_write_creates_directories() {
        let (_dir, ws) = setup_test().await;

        ws.write("sub/dir/x.md", "nested", "save", "user")
            .await
            .unwrap();
        assert_eq!(ws.read("sub/dir/x.md").await.unwrap(), "nested");

        let docs = ws.list_documents().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].path, "sub/dir/x.md");
    }

    #[tokio::test]
    async fn test_unsafe_paths_rejected_with_no_side_effects() {
        let (_dir, ws) = setup_test().await;

        for bad in ["../x.md", "/etc/x.md", "x.txt"] {
            assert!(
                matches!(
                    ws.write(bad, "nope", "save", "user").await,
                    Err(WorkspaceError::InvalidPath(_))
                ),
                "{bad}"
            );
            assert!(matches!(
                ws.read(bad).await,
                Err(WorkspaceError::InvalidPath(_))
            ));
            assert!(matches!(
                ws.create(bad, None).await,
                Err(WorkspaceError::InvalidPath(_))
            ));
        }

        // Nothing was written or snapshotted.
        assert!(ws.list_documents().unwrap().is_empty());
        assert!(ws.list_snapshots("x.txt", 200).await.is_err());
    }

    #[tokio::test]
    async fn test_create_rejects_existing_document() {
        let (_dir, ws) = setup_test().await;

        ws.create("a.md", Some("# Seed\n")).await.unwrap();
        assert_eq!(ws.read("a.md").await.unwrap(), "# Seed\n");

        assert!(matches!(
            ws.create("a.md", None).await,
            Err(WorkspaceError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_revert_appends_and_restores() {
        let (_dir, ws) = setup_test().await;

        let first = ws.write("a.md", "v1", "save", "user").await.unwrap();
        ws.write("a.md", "v2", "save", "user").await.unwrap();

        let new_id = ws.revert("a.md", &first, "user").await.unwrap();
        assert_ne!(new_id, first);
        assert_eq!(ws.read("a.md").await.unwrap(), "v1");

        let history = ws.list_snapshots("a.md", 200).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].id, new_id);
        assert_eq!(history[0].reason, format!("revert:{first}"));
    }

    #[tokio::test]
    async fn test_revert_unknown_snapshot_has_no_side_effects() {
        let (_dir, ws) = setup_test().await;

        ws.write("a.md", "v1", "save", "user").await.unwrap();

        let result = ws
            .revert("a.md", &SnapshotId::from_string("snp_missing"), "user")
            .await;
        assert!(matches!(result, Err(WorkspaceError::NotFound(_))));

        assert_eq!(ws.read("a.md").await.unwrap(), "v1");
        assert_eq!(ws.list_snapshots("a.md", 200).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_documents_sorted_case_insensitively() {
        let (_dir, ws) = setup_test().await;

        ws.write("Beta.md", "b", "save", "user").await.unwrap();
        ws.write("alpha.md", "a", "save", "user").await.unwrap();
        ws.write("gamma.md", "c", "save", "user").await.unwrap();

        let docs = ws.list_documents().unwrap();
        let paths: Vec<&str> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["alpha.md", "Beta.md", "gamma.md"]);
        assert_eq!(docs[0].size_bytes, 1);
    }
}
