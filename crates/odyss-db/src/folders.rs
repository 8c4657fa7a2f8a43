//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};
use tracing::{debug, info, warn};

use odyss_core::{
    CreateFolderRequest, Error, Folder, FolderChange, FolderRepository, Result,
    UpdateFolderRequest,
};

use crate::{constraint_error, describe_reference};

const FOLDER_COLUMNS: &str = "id, name, parent_id, vault_id, created_at";

/// PostgreSQL implementation of FolderRepository.
#[derive(Clone)]
pub struct PgFolderRepository {
    pool: Pool<Postgres>,
}

impl PgFolderRepository {
    /// Create a new PgFolderRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn require_parent_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        parent_id: i64,
    ) -> Result<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM folders WHERE id = $1)")
            .bind(parent_id)
            .fetch_one(&mut **tx)
            .await
            .map_err(Error::Database)?;
        if !exists {
            return Err(Error::InvalidInput("Parent folder not found".to_string()));
        }
        Ok(())
    }

    /// Whether `folder_id` appears on the ancestry chain starting at
    /// `start_id` (inclusive).
    ///
    /// `UNION` (not `UNION ALL`) stops the walk on any pre-existing cycle.
    pub async fn is_ancestor_or_self_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        folder_id: i64,
        start_id: i64,
    ) -> Result<bool> {
        sqlx::query_scalar(
            "WITH RECURSIVE ancestry(id, parent_id) AS (
                 SELECT id, parent_id FROM folders WHERE id = $1
                 UNION
                 SELECT f.id, f.parent_id
                 FROM folders f
                 JOIN ancestry a ON f.id = a.parent_id
             )
             SELECT EXISTS(SELECT 1 FROM ancestry WHERE id = $2)",
        )
        .bind(start_id)
        .bind(folder_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)
    }
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn list(&self, vault_id: Option<i64>) -> Result<Vec<Folder>> {
        sqlx::query_as(&format!(
            "SELECT {} FROM folders
             WHERE ($1::BIGINT IS NULL OR vault_id = $1)
             ORDER BY id",
            FOLDER_COLUMNS
        ))
        .bind(vault_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn get(&self, id: i64) -> Result<Option<Folder>> {
        sqlx::query_as(&format!(
            "SELECT {} FROM folders WHERE id = $1",
            FOLDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn create(&self, req: CreateFolderRequest) -> Result<Folder> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let parent_id = req.parent();
        if let Some(parent_id) = parent_id {
            self.require_parent_tx(&mut tx, parent_id).await?;
        }

        let folder: Folder = sqlx::query_as(&format!(
            "INSERT INTO folders (name, parent_id, vault_id) VALUES ($1, $2, $3) RETURNING {}",
            FOLDER_COLUMNS
        ))
        .bind(&req.name)
        .bind(parent_id)
        .bind(req.vault_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, describe_reference))?;

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "folders",
            op = "create",
            folder_id = folder.id,
            vault_id = ?folder.vault_id,
            "Created folder"
        );
        Ok(folder)
    }

    async fn update(&self, id: i64, req: UpdateFolderRequest) -> Result<Folder> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let current: Option<Folder> = sqlx::query_as(&format!(
            "SELECT {} FROM folders WHERE id = $1 FOR UPDATE",
            FOLDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(Error::Database)?;
        let current = current.ok_or_else(|| Error::NotFound("Folder not found".to_string()))?;

        let parent_id = match req.parent_change() {
            FolderChange::Keep => current.parent_id,
            FolderChange::Detach => None,
            FolderChange::MoveTo(parent_id) => {
                if parent_id == id {
                    return Err(Error::InvalidInput(
                        "Folder cannot be its own parent".to_string(),
                    ));
                }
                self.require_parent_tx(&mut tx, parent_id).await?;
                if self.is_ancestor_or_self_tx(&mut tx, id, parent_id).await? {
                    return Err(Error::InvalidInput(
                        "Folder cannot be moved into its own subfolder".to_string(),
                    ));
                }
                Some(parent_id)
            }
        };
        let name = req.name.unwrap_or(current.name);

        let folder: Folder = sqlx::query_as(&format!(
            "UPDATE folders SET name = $1, parent_id = $2 WHERE id = $3 RETURNING {}",
            FOLDER_COLUMNS
        ))
        .bind(&name)
        .bind(parent_id)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(folder)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM folders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if locked.is_none() {
            return Err(Error::NotFound("Folder not found".to_string()));
        }

        let detached = sqlx::query("UPDATE notes SET folder_id = NULL WHERE folder_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        let orphaned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE parent_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(Error::Database)?;

        sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "folders",
            op = "delete",
            folder_id = id,
            detached_notes = detached,
            "Deleted folder"
        );
        if orphaned > 0 {
            warn!(
                subsystem = "database",
                component = "folders",
                op = "delete",
                folder_id = id,
                orphaned_children = orphaned,
                "Child folders still reference the deleted folder"
            );
        }
        Ok(())
    }
}
