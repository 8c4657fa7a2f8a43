//! Note history endpoints.

use axum::{extract::State, Json};

use odyss_core::{NoteFull, NoteVersion, VersionRepository};

use crate::extract::ApiPath;
use crate::{ApiError, AppState};

/// List a note's snapshots, newest first.
pub async fn list_versions(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<NoteVersion>>, ApiError> {
    let versions = state.db.versions.list_versions(id).await?;
    Ok(Json(versions))
}

/// Restore a snapshot onto its note.
///
/// The note's current text is snapshotted first, so a restore can itself
/// be undone.
///
/// # Returns
/// - 200 OK with the restored note
/// - 404 Not Found if the note is missing or the version belongs to another note
pub async fn restore_version(
    State(state): State<AppState>,
    ApiPath((id, version_id)): ApiPath<(i64, i64)>,
) -> Result<Json<NoteFull>, ApiError> {
    let note = state.db.versions.restore_version(id, version_id).await?;
    Ok(Json(note))
}
