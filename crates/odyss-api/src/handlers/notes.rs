//! Note endpoints. Every write recomputes the note's outbound links.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use odyss_core::{
    CreateNoteRequest, ListNotesRequest, NoteFull, NoteRepository, UpdateNoteRequest,
};

use super::MessageResponse;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::{validation, ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ListNotesQuery {
    pub folder_id: Option<i64>,
    pub vault_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteBody {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub folder_id: Option<i64>,
    pub vault_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteBody {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Zero or negative removes the note from its folder.
    pub folder_id: Option<i64>,
}

/// List notes, most recently updated first.
///
/// # Query Parameters
/// - `folder_id`: only notes in this folder (optional)
/// - `vault_id`: only notes in this vault (optional)
pub async fn list_notes(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListNotesQuery>,
) -> Result<Json<Vec<NoteFull>>, ApiError> {
    let notes = state
        .db
        .notes
        .list(ListNotesRequest {
            folder_id: query.folder_id,
            vault_id: query.vault_id,
        })
        .await?;
    Ok(Json(notes))
}

pub async fn get_note(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<NoteFull>, ApiError> {
    Ok(Json(state.db.notes.fetch(id).await?))
}

/// Create a note and resolve its `[[wikilinks]]`.
///
/// # Returns
/// - 201 Created with the note and its link sets
/// - 400 Bad Request if the folder or vault does not exist
/// - 422 Unprocessable Entity on an empty or oversized title
pub async fn create_note(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateNoteBody>,
) -> Result<(StatusCode, Json<NoteFull>), ApiError> {
    validation::name("title", &body.title)?;
    let note = state
        .db
        .notes
        .insert(CreateNoteRequest {
            title: body.title,
            content: body.content,
            folder_id: body.folder_id,
            vault_id: body.vault_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// Update a note. A change to title or content snapshots the previous
/// text as a version first.
pub async fn update_note(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateNoteBody>,
) -> Result<Json<NoteFull>, ApiError> {
    if let Some(title) = &body.title {
        validation::name("title", title)?;
    }
    let note = state
        .db
        .notes
        .update(
            id,
            UpdateNoteRequest {
                title: body.title,
                content: body.content,
                folder_id: body.folder_id,
            },
        )
        .await?;
    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.db.notes.delete(id).await?;
    Ok(Json(MessageResponse::new("Note deleted")))
}
