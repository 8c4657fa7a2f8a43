//! Folder endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use odyss_core::{CreateFolderRequest, Folder, FolderRepository, UpdateFolderRequest};

use super::MessageResponse;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::{validation, ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ListFoldersQuery {
    pub vault_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderBody {
    pub name: String,
    pub parent_id: Option<i64>,
    pub vault_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFolderBody {
    pub name: Option<String>,
    /// Zero or negative moves the folder to the root.
    pub parent_id: Option<i64>,
}

pub async fn list_folders(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListFoldersQuery>,
) -> Result<Json<Vec<Folder>>, ApiError> {
    let folders = state.db.folders.list(query.vault_id).await?;
    Ok(Json(folders))
}

pub async fn create_folder(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateFolderBody>,
) -> Result<(StatusCode, Json<Folder>), ApiError> {
    validation::name("name", &body.name)?;
    let folder = state
        .db
        .folders
        .create(CreateFolderRequest {
            name: body.name,
            parent_id: body.parent_id,
            vault_id: body.vault_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(folder)))
}

/// Rename and/or move a folder.
///
/// # Returns
/// - 200 OK with the updated folder
/// - 400 Bad Request if the new parent is missing or would create a cycle
/// - 404 Not Found if the folder does not exist
pub async fn update_folder(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateFolderBody>,
) -> Result<Json<Folder>, ApiError> {
    if let Some(name) = &body.name {
        validation::name("name", name)?;
    }
    let folder = state
        .db
        .folders
        .update(
            id,
            UpdateFolderRequest {
                name: body.name,
                parent_id: body.parent_id,
            },
        )
        .await?;
    Ok(Json(folder))
}

/// Delete a folder. Its notes stay, detached from any folder.
pub async fn delete_folder(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.db.folders.delete(id).await?;
    Ok(Json(MessageResponse::new("Folder deleted")))
}
