//! Note repository implementation.
//!
//! Every write runs in one transaction with its side effects: the version
//! snapshot of the previous text and the recomputed outbound link set.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};
use tracing::{debug, info};

use odyss_core::{
    CreateNoteRequest, Error, FolderChange, ListNotesRequest, Note, NoteFull, NoteRepository,
    Result, UpdateNoteRequest,
};

use crate::links::PgLinkRepository;
use crate::{constraint_error, describe_reference};

pub(crate) const NOTE_COLUMNS: &str =
    "id, title, content, folder_id, vault_id, created_at, updated_at";

pub(crate) fn note_not_found() -> Error {
    Error::NotFound("Note not found".to_string())
}

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
    links: PgLinkRepository,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            links: PgLinkRepository::new(pool.clone()),
            pool,
        }
    }

    /// Lock a note row for the rest of the transaction.
    pub async fn lock_tx(&self, tx: &mut Transaction<'_, Postgres>, id: i64) -> Result<Note> {
        let note: Option<Note> = sqlx::query_as(&format!(
            "SELECT {} FROM notes WHERE id = $1 FOR UPDATE",
            NOTE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::Database)?;
        note.ok_or_else(note_not_found)
    }

    /// Store the note's current title and content as a version.
    pub async fn snapshot_tx(&self, tx: &mut Transaction<'_, Postgres>, note: &Note) -> Result<()> {
        sqlx::query("INSERT INTO note_versions (note_id, title, content) VALUES ($1, $2, $3)")
            .bind(note.id)
            .bind(&note.title)
            .bind(&note.content)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "versions",
            op = "snapshot",
            note_id = note.id,
            "Stored version snapshot"
        );
        Ok(())
    }

    /// Overwrite title and content, refresh `updated_at` and relink.
    pub async fn write_text_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        title: &str,
        content: &str,
    ) -> Result<()> {
        sqlx::query("UPDATE notes SET title = $1, content = $2, updated_at = NOW() WHERE id = $3")
            .bind(title)
            .bind(content)
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        self.links.replace_outgoing_tx(tx, id, content).await?;
        Ok(())
    }

    pub async fn fetch_tx(&self, tx: &mut Transaction<'_, Postgres>, id: i64) -> Result<NoteFull> {
        let note: Option<Note> = sqlx::query_as(&format!(
            "SELECT {} FROM notes WHERE id = $1",
            NOTE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::Database)?;
        let note = note.ok_or_else(note_not_found)?;

        let links_to = self.links.get_outgoing_tx(tx, id).await?;
        let linked_from = self.links.get_incoming_tx(tx, id).await?;
        Ok(NoteFull::new(note, links_to, linked_from))
    }

    pub async fn list_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        req: ListNotesRequest,
    ) -> Result<Vec<NoteFull>> {
        let notes: Vec<Note> = sqlx::query_as(&format!(
            "SELECT {} FROM notes
             WHERE ($1::BIGINT IS NULL OR folder_id = $1)
               AND ($2::BIGINT IS NULL OR vault_id = $2)
             ORDER BY updated_at DESC, id DESC",
            NOTE_COLUMNS
        ))
        .bind(req.folder_id)
        .bind(req.vault_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)?;

        let ids: Vec<i64> = notes.iter().map(|n| n.id).collect();
        let mut sets = self.links.link_sets_tx(tx, &ids).await?;

        Ok(notes
            .into_iter()
            .map(|note| {
                let (links_to, linked_from) = sets.take(note.id);
                NoteFull::new(note, links_to, linked_from)
            })
            .collect())
    }

    pub async fn insert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        req: CreateNoteRequest,
    ) -> Result<NoteFull> {
        let note: Note = sqlx::query_as(&format!(
            "INSERT INTO notes (title, content, folder_id, vault_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(req.title.trim())
        .bind(&req.content)
        .bind(req.folder_id)
        .bind(req.vault_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| constraint_error(e, describe_reference))?;

        self.links
            .replace_outgoing_tx(tx, note.id, &note.content)
            .await?;
        self.fetch_tx(tx, note.id).await
    }

    pub async fn update_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        req: UpdateNoteRequest,
    ) -> Result<NoteFull> {
        let current = self.lock_tx(tx, id).await?;

        if req.changes_text_of(&current) {
            self.snapshot_tx(tx, &current).await?;
        }

        let title = req.trimmed_title().unwrap_or(&current.title).to_string();
        let content = req.content.clone().unwrap_or_else(|| current.content.clone());
        let folder_id = match req.folder_change() {
            FolderChange::Keep => current.folder_id,
            FolderChange::Detach => None,
            FolderChange::MoveTo(folder_id) => Some(folder_id),
        };

        sqlx::query("UPDATE notes SET folder_id = $1 WHERE id = $2")
            .bind(folder_id)
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| constraint_error(e, describe_reference))?;

        self.write_text_tx(tx, id, &title, &content).await?;
        self.fetch_tx(tx, id).await
    }

    pub async fn delete_tx(&self, tx: &mut Transaction<'_, Postgres>, id: i64) -> Result<()> {
        // Versions and links in both directions cascade.
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(note_not_found());
        }
        Ok(())
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn list(&self, req: ListNotesRequest) -> Result<Vec<NoteFull>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let result = self.list_tx(&mut tx, req).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(result)
    }

    async fn fetch(&self, id: i64) -> Result<NoteFull> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let result = self.fetch_tx(&mut tx, id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(result)
    }

    async fn insert(&self, req: CreateNoteRequest) -> Result<NoteFull> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let result = self.insert_tx(&mut tx, req).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "notes",
            op = "insert",
            note_id = result.note.id,
            vault_id = ?result.note.vault_id,
            link_count = result.links_to.len(),
            "Created note"
        );
        Ok(result)
    }

    async fn update(&self, id: i64, req: UpdateNoteRequest) -> Result<NoteFull> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let result = self.update_tx(&mut tx, id, req).await?;
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "notes",
            op = "update",
            note_id = id,
            link_count = result.links_to.len(),
            "Updated note"
        );
        Ok(result)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        self.delete_tx(&mut tx, id).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "notes",
            op = "delete",
            note_id = id,
            "Deleted note"
        );
        Ok(())
    }
}
