//! Note version history.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};
use tracing::info;

use odyss_core::{Error, NoteFull, NoteVersion, Result, VersionRepository};

use crate::notes::{note_not_found, PgNoteRepository};

const VERSION_COLUMNS: &str = "id, note_id, title, content, created_at";

/// Repository for note version history.
#[derive(Clone)]
pub struct VersioningRepository {
    pool: Pool<Postgres>,
    notes: PgNoteRepository,
}

impl VersioningRepository {
    /// Create a new versioning repository.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn list_versions_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        note_id: i64,
    ) -> Result<Vec<NoteVersion>> {
        if !self.notes.exists_tx(tx, note_id).await? {
            return Err(note_not_found());
        }

        sqlx::query_as(&format!(
            "SELECT {} FROM note_versions
             WHERE note_id = $1
             ORDER BY created_at DESC, id DESC",
            VERSION_COLUMNS
        ))
        .bind(note_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)
    }

    pub async fn get_version_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        note_id: i64,
        version_id: i64,
    ) -> Result<NoteVersion> {
        let version: Option<NoteVersion> = sqlx::query_as(&format!(
            "SELECT {} FROM note_versions WHERE id = $1 AND note_id = $2",
            VERSION_COLUMNS
        ))
        .bind(version_id)
        .bind(note_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::Database)?;
        version.ok_or_else(|| Error::NotFound("Version not found".to_string()))
    }

    pub async fn restore_version_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        note_id: i64,
        version_id: i64,
    ) -> Result<NoteFull> {
        let current = self.notes.lock_tx(tx, note_id).await?;
        let version = self.get_version_tx(tx, note_id, version_id).await?;

        // The pre-restore state becomes a version of its own.
        self.notes.snapshot_tx(tx, &current).await?;
        self.notes
            .write_text_tx(tx, note_id, &version.title, &version.content)
            .await?;
        self.notes.fetch_tx(tx, note_id).await
    }
}

#[async_trait]
impl VersionRepository for VersioningRepository {
    async fn list_versions(&self, note_id: i64) -> Result<Vec<NoteVersion>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let result = self.list_versions_tx(&mut tx, note_id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(result)
    }

    async fn restore_version(&self, note_id: i64, version_id: i64) -> Result<NoteFull> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let result = self.restore_version_tx(&mut tx, note_id, version_id).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "versions",
            op = "restore",
            note_id,
            version_id,
            "Restored note version"
        );
        Ok(result)
    }
}
