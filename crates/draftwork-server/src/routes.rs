//! HTTP routes for the server.

use crate::{state::AppState, ws::ws_handler};
use axum::{
    extract::{Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use draftwork_render::{
    extract_outline, list_platforms, render_platform_html, Lang, OutlineNode, Platform,
};
use draftwork_snapshot::{SnapshotId, SnapshotMeta};
use draftwork_workspace::WorkspaceError;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Default history page size.
const SNAPSHOT_LIST_LIMIT: usize = 200;

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    Router::new()
        .route("/api/health", get(health))
        // Documents
        .route("/api/files", get(files_list))
        .route("/api/file", get(file_read).put(file_write))
        .route("/api/file/new", post(file_new))
        // Snapshots
        .route("/api/snapshots", get(snapshots_list))
        .route("/api/snapshots/revert", post(snapshots_revert))
        // Export
        .route("/api/platforms", get(platforms))
        .route("/api/export", post(export))
        .route("/api/outline", post(outline))
        // Rewrite sessions
        .route("/ws/agent", get(ws_handler))
        .with_state(state)
        .layer(cors)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let any_origin =
        allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*");

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if any_origin {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct ApiError {
    error: String,
    code: String,
}

impl ApiError {
    fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }

    fn not_found(msg: impl Into<String>) -> (StatusCode, Json<Self>) {
        (StatusCode::NOT_FOUND, Json(Self::new(msg, "NOT_FOUND")))
    }

    fn invalid_path(msg: impl Into<String>) -> (StatusCode, Json<Self>) {
        (StatusCode::BAD_REQUEST, Json(Self::new(msg, "INVALID_PATH")))
    }

    fn already_exists(msg: impl Into<String>) -> (StatusCode, Json<Self>) {
        (StatusCode::CONFLICT, Json(Self::new(msg, "ALREADY_EXISTS")))
    }

    fn storage(msg: impl Into<String>) -> (StatusCode, Json<Self>) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Self::new(msg, "STORAGE_FAILURE")),
        )
    }
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

fn map_workspace_error(e: WorkspaceError) -> (StatusCode, Json<ApiError>) {
    match &e {
        WorkspaceError::InvalidPath(_) => ApiError::invalid_path(e.to_string()),
        WorkspaceError::NotFound(_) => ApiError::not_found(e.to_string()),
        WorkspaceError::AlreadyExists(_) => ApiError::already_exists(e.to_string()),
        WorkspaceError::Storage(_) | WorkspaceError::Snapshot(_) => {
            warn!("Storage failure: {e}");
            ApiError::storage(e.to_string())
        }
    }
}

// =============================================================================
// Health
// =============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "healthy": true,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// =============================================================================
// Document endpoints
// =============================================================================

#[derive(Debug, Serialize)]
struct FileInfo {
    path: String,
    size_bytes: u64,
    updated_at: DateTime<Utc>,
}

async fn files_list(State(state): State<AppState>) -> ApiResult<Json<Vec<FileInfo>>> {
    let docs = state
        .workspace
        .list_documents()
        .map_err(map_workspace_error)?;
    let response = docs
        .into_iter()
        .map(|d| FileInfo {
            path: d.path,
            size_bytes: d.size_bytes,
            updated_at: d.updated_at,
        })
        .collect();
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct FilePathQuery {
    path: String,
}

#[derive(Debug, Serialize)]
struct FileReadResponse {
    path: String,
    content: String,
}

async fn file_read(
    State(state): State<AppState>,
    Query(query): Query<FilePathQuery>,
) -> ApiResult<Json<FileReadResponse>> {
    let content = state
        .workspace
        .read(&query.path)
        .await
        .map_err(map_workspace_error)?;
    Ok(Json(FileReadResponse {
        path: query.path,
        content,
    }))
}

#[derive(Debug, Deserialize)]
struct FileWriteRequest {
    content: String,
    #[serde(default = "default_reason")]
    reason: String,
    #[serde(default = "default_actor")]
    actor: String,
}

fn default_reason() -> String {
    "save".to_string()
}

fn default_actor() -> String {
    "user".to_string()
}

#[derive(Debug, Serialize)]
struct FileWriteResponse {
    path: String,
    snapshot_id: SnapshotId,
}

async fn file_write(
    State(state): State<AppState>,
    Query(query): Query<FilePathQuery>,
    Json(payload): Json<FileWriteRequest>,
) -> ApiResult<Json<FileWriteResponse>> {
    let snapshot_id = state
        .workspace
        .write(&query.path, &payload.content, &payload.reason, &payload.actor)
        .await
        .map_err(map_workspace_error)?;
    Ok(Json(FileWriteResponse {
        path: query.path,
        snapshot_id,
    }))
}

#[derive(Debug, Deserialize)]
struct FileNewRequest {
    path: String,
    #[serde(default)]
    template: Option<String>,
}

async fn file_new(
    State(state): State<AppState>,
    Json(payload): Json<FileNewRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    state
        .workspace
        .create(&payload.path, payload.template.as_deref())
        .await
        .map_err(map_workspace_error)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "ok": true })),
    ))
}

// =============================================================================
// Snapshot endpoints
// =============================================================================

#[derive(Debug, Serialize)]
struct SnapshotListResponse {
    path: String,
    snapshots: Vec<SnapshotMeta>,
}

async fn snapshots_list(
    State(state): State<AppState>,
    Query(query): Query<FilePathQuery>,
) -> ApiResult<Json<SnapshotListResponse>> {
    let snapshots = state
        .workspace
        .list_snapshots(&query.path, SNAPSHOT_LIST_LIMIT)
        .await
        .map_err(map_workspace_error)?;
    Ok(Json(SnapshotListResponse {
        path: query.path,
        snapshots,
    }))
}

#[derive(Debug, Deserialize)]
struct RevertRequest {
    path: String,
    snapshot_id: String,
}

#[derive(Debug, Serialize)]
struct RevertResponse {
    path: String,
    snapshot_id: SnapshotId,
}

async fn snapshots_revert(
    State(state): State<AppState>,
    Json(payload): Json<RevertRequest>,
) -> ApiResult<Json<RevertResponse>> {
    let new_id = state
        .workspace
        .revert(
            &payload.path,
            &SnapshotId::from_string(payload.snapshot_id),
            "user",
        )
        .await
        .map_err(map_workspace_error)?;
    Ok(Json(RevertResponse {
        path: payload.path,
        snapshot_id: new_id,
    }))
}

// =============================================================================
// Export endpoints
// =============================================================================

async fn platforms() -> impl IntoResponse {
    Json(list_platforms())
}

#[derive(Debug, Deserialize)]
struct ExportRequest {
    platform: Platform,
    content: String,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExportResponse {
    platform: Platform,
    html: String,
    warnings: Vec<String>,
}

async fn export(Json(payload): Json<ExportRequest>) -> impl IntoResponse {
    let (html, warnings) =
        render_platform_html(&payload.content, payload.platform, payload.title.as_deref());
    Json(ExportResponse {
        platform: payload.platform,
        html,
        warnings,
    })
}

#[derive(Debug, Deserialize)]
struct OutlineRequest {
    content: String,
    #[serde(default)]
    lang: Lang,
}

#[derive(Debug, Serialize)]
struct OutlineResponse {
    nodes: Vec<OutlineNode>,
}

async fn outline(Json(payload): Json<OutlineRequest>) -> impl IntoResponse {
    Json(OutlineResponse {
        nodes: extract_outline(&payload.content, payload.lang),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftwork_provider::ProviderConfig;
    use draftwork_snapshot::SnapshotStore;
    use draftwork_workspace::Workspace;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn test_state() -> (TempDir, AppState) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(
            SnapshotStore::new(dir.path().join("snapshots"))
                .await
                .unwrap(),
        );
        let workspace = Arc::new(
            Workspace::new(dir.path().join("workspace"), store)
                .await
                .unwrap(),
        );
        let state = AppState::new(workspace, ProviderConfig::default());
        (dir, state)
    }

    #[tokio::test]
    async fn test_write_then_read_through_handlers() {
        let (_dir, state) = test_state().await;

        let write = file_write(
            State(state.clone()),
            Query(FilePathQuery {
                path: "a.md".to_string(),
            }),
            Json(FileWriteRequest {
                content: "# Hi\n".to_string(),
                reason: "save".to_string(),
                actor: "user".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(write.0.path, "a.md");

        let read = file_read(
            State(state),
            Query(FilePathQuery {
                path: "a.md".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(read.0.content, "# Hi\n");
    }

    #[tokio::test]
    async fn test_read_missing_maps_to_not_found() {
        let (_dir, state) = test_state().await;
        let err = file_read(
            State(state),
            Query(FilePathQuery {
                path: "missing.md".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_path_maps_to_bad_request() {
        let (_dir, state) = test_state().await;
        let err = file_read(
            State(state),
            Query(FilePathQuery {
                path: "../etc/passwd.md".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(err.1.code, "INVALID_PATH");
    }

    #[tokio::test]
    async fn test_create_conflict_maps_to_409() {
        let (_dir, state) = test_state().await;

        file_new(
            State(state.clone()),
            Json(FileNewRequest {
                path: "a.md".to_string(),
                template: None,
            }),
        )
        .await
        .unwrap();

        let err = file_new(
            State(state),
            Json(FileNewRequest {
                path: "a.md".to_string(),
                template: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_revert_round_trip_through_handlers() {
        let (_dir, state) = test_state().await;

        let first = state
            .workspace
            .write("a.md", "v1", "save", "user")
            .await
            .unwrap();
        state
            .workspace
            .write("a.md", "v2", "save", "user")
            .await
            .unwrap();

        let reverted = snapshots_revert(
            State(state.clone()),
            Json(RevertRequest {
                path: "a.md".to_string(),
                snapshot_id: first.to_string(),
            }),
        )
        .await
        .unwrap();
        assert_ne!(reverted.0.snapshot_id, first);

        let listed = snapshots_list(
            State(state),
            Query(FilePathQuery {
                path: "a.md".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(listed.0.snapshots.len(), 3);
    }

    #[tokio::test]
    async fn test_revert_unknown_snapshot_is_404() {
        let (_dir, state) = test_state().await;
        state
            .workspace
            .write("a.md", "v1", "save", "user")
            .await
            .unwrap();

        let err = snapshots_revert(
            State(state),
            Json(RevertRequest {
                path: "a.md".to_string(),
                snapshot_id: "snp_unknown".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }
}
