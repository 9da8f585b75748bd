//! Document path validation.
//!
//! A document path is a logical identifier that must map to exactly one
//! file strictly inside the workspace root. Validation rejects before any
//! filesystem mutation, so a bad path never has side effects.

use crate::{WorkspaceError, WorkspaceResult};
use std::path::{Component, Path, PathBuf};

/// The only document extension the workspace recognizes.
pub const DOCUMENT_EXTENSION: &str = "md";

/// Validate a logical document path and resolve it under `root`.
///
/// `root` must already be canonicalized. Rules, in order:
/// - separators are normalized (`\` -> `/`)
/// - absolute paths and parent-directory (`..`) segments are rejected
/// - the extension must be `.md` (case-insensitive)
/// - the resolved location must be equal to or strictly nested under the
///   root, after following any symlinks in the existing ancestry
pub fn resolve_document_path(root: &Path, path: &str) -> WorkspaceResult<PathBuf> {
    if path.trim().is_empty() {
        return Err(WorkspaceError::invalid_path("empty path"));
    }

    let normalized = path.replace('\\', "/");
    let rel = Path::new(&normalized);

    if rel.is_absolute() || normalized.starts_with('/') {
        return Err(WorkspaceError::invalid_path(format!(
            "absolute paths are not allowed: {path}"
        )));
    }

    for component in rel.components() {
        match component {
            Component::ParentDir => {
                return Err(WorkspaceError::invalid_path(format!(
                    "parent-directory segments are not allowed: {path}"
                )));
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(WorkspaceError::invalid_path(format!(
                    "absolute paths are not allowed: {path}"
                )));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    let extension_ok = rel
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION));
    if !extension_ok {
        return Err(WorkspaceError::invalid_path(format!(
            "only .{DOCUMENT_EXTENSION} documents are allowed: {path}"
        )));
    }

    let full = root.join(rel);

    // Defend against symlink escapes: canonicalize the deepest existing
    // ancestor and require it to stay under the root.
    let mut probe = full.as_path();
    let resolved_ancestor = loop {
        if probe.exists() {
            break probe.canonicalize().map_err(WorkspaceError::Storage)?;
        }
        probe = probe
            .parent()
            .ok_or_else(|| WorkspaceError::invalid_path(format!("path escapes workspace: {path}")))?;
    };

    if !resolved_ancestor.starts_with(root) {
        return Err(WorkspaceError::invalid_path(format!(
            "path escapes workspace: {path}"
        )));
    }

    Ok(full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn root() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let canonical = dir.path().canonicalize().unwrap();
        (dir, canonical)
    }

    #[test]
    fn test_plain_and_nested_paths_resolve() {
        let (_dir, root) = root();
        assert!(resolve_document_path(&root, "a.md").is_ok());
        assert!(resolve_document_path(&root, "sub/dir/x.md").is_ok());
        assert!(resolve_document_path(&root, "UPPER.MD").is_ok());
    }

    #[test]
    fn test_backslash_separators_are_normalized() {
        let (_dir, root) = root();
        let resolved = resolve_document_path(&root, "sub\\dir\\x.md").unwrap();
        assert_eq!(resolved, root.join("sub/dir/x.md"));
    }

    #[test]
    fn test_parent_segments_are_rejected() {
        let (_dir, root) = root();
        for bad in ["../x.md", "a/../../x.md", "..\\x.md"] {
            let err = resolve_document_path(&root, bad).unwrap_err();
            assert!(matches!(err, WorkspaceError::InvalidPath(_)), "{bad}");
        }
    }

    #[test]
    fn test_absolute_paths_are_rejected() {
        let (_dir, root) = root();
        let err = resolve_document_path(&root, "/etc/x.md").unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidPath(_)));
    }

    #[test]
    fn test_wrong_extension_is_rejected() {
        let (_dir, root) = root();
        for bad in ["x.txt", "x", "x.md.bak"] {
            let err = resolve_document_path(&root, bad).unwrap_err();
            assert!(matches!(err, WorkspaceError::InvalidPath(_)), "{bad}");
        }
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let (_dir, root) = root();
        assert!(matches!(
            resolve_document_path(&root, "  "),
            Err(WorkspaceError::InvalidPath(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_is_rejected() {
        let (_outside, outside_root) = root();
        let (_dir, root) = root();

        std::os::unix::fs::symlink(&outside_root, root.join("link")).unwrap();
        let err = resolve_document_path(&root, "link/x.md").unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidPath(_)));
    }
}
