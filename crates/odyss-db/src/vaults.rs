//! Vault repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::{debug, info};

use odyss_core::defaults::MAX_VAULTS_PER_OWNER;
use odyss_core::{Error, Result, Vault, VaultRepository};

const VAULT_COLUMNS: &str = "id, name, owner_id, is_default, created_at";

/// Message for the per-owner cap.
pub fn vault_limit_message() -> String {
    format!(
        "Maximum vault limit reached ({}). Upgrade to create more.",
        MAX_VAULTS_PER_OWNER
    )
}

/// PostgreSQL implementation of VaultRepository.
#[derive(Clone)]
pub struct PgVaultRepository {
    pool: Pool<Postgres>,
}

impl PgVaultRepository {
    /// Create a new PgVaultRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VaultRepository for PgVaultRepository {
    async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<Vault>> {
        sqlx::query_as(&format!(
            "SELECT {} FROM vaults WHERE owner_id = $1 ORDER BY created_at, id",
            VAULT_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn create(&self, owner_id: i64, name: &str) -> Result<Vault> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Serialize concurrent creates for the same owner so the cap holds.
        let owner: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;
        if owner.is_none() {
            return Err(Error::NotFound("User not found".to_string()));
        }

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vaults WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if count >= MAX_VAULTS_PER_OWNER {
            debug!(
                subsystem = "database",
                component = "vaults",
                op = "create",
                user_id = owner_id,
                vault_count = count,
                "Vault cap reached"
            );
            return Err(Error::Forbidden(vault_limit_message()));
        }

        let vault: Vault = sqlx::query_as(&format!(
            "INSERT INTO vaults (name, owner_id, is_default) VALUES ($1, $2, FALSE) RETURNING {}",
            VAULT_COLUMNS
        ))
        .bind(name)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "vaults",
            op = "create",
            user_id = owner_id,
            vault_id = vault.id,
            "Created vault"
        );
        Ok(vault)
    }

    async fn get_for_owner(&self, owner_id: i64, id: i64) -> Result<Option<Vault>> {
        sqlx::query_as(&format!(
            "SELECT {} FROM vaults WHERE id = $1 AND owner_id = $2",
            VAULT_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn delete(&self, owner_id: i64, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let vault: Option<Vault> = sqlx::query_as(&format!(
            "SELECT {} FROM vaults WHERE id = $1 AND owner_id = $2 FOR UPDATE",
            VAULT_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let vault = vault.ok_or_else(|| Error::NotFound("Vault not found".to_string()))?;
        if vault.is_default {
            return Err(Error::Forbidden("Cannot delete default vault".to_string()));
        }

        // Folders, notes, their versions and links go with the vault.
        sqlx::query("DELETE FROM vaults WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "vaults",
            op = "delete",
            user_id = owner_id,
            vault_id = id,
            "Deleted vault"
        );
        Ok(())
    }
}
