//! User repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};
use tracing::{debug, info};

use odyss_core::{CreateUserRequest, Error, Result, User, UserRepository, Vault};

use crate::constraint_error;

const USER_COLUMNS: &str =
    "id, email, username, hashed_password, is_active, is_guest, created_at, last_login";

const EMAIL_TAKEN: &str = "Email already registered";
const USERNAME_TAKEN: &str = "Username already taken";

fn describe_user_constraint(constraint: &str) -> String {
    match constraint {
        "users_email_key" => EMAIL_TAKEN.to_string(),
        "users_username_key" => USERNAME_TAKEN.to_string(),
        other => format!("Constraint violated: {}", other),
    }
}

/// PostgreSQL implementation of UserRepository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert the user row and its default vault inside `tx`.
    pub async fn create_with_default_vault_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        req: CreateUserRequest,
    ) -> Result<(User, Vault)> {
        let user: User = sqlx::query_as(&format!(
            "INSERT INTO users (email, username, hashed_password, is_guest)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&req.email)
        .bind(&req.username)
        .bind(&req.hashed_password)
        .bind(req.is_guest)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| constraint_error(e, describe_user_constraint))?;

        let vault: Vault = sqlx::query_as(
            "INSERT INTO vaults (name, owner_id, is_default)
             VALUES ($1, $2, TRUE)
             RETURNING id, name, owner_id, is_default, created_at",
        )
        .bind(&req.default_vault_name)
        .bind(user.id)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok((user, vault))
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_with_default_vault(&self, req: CreateUserRequest) -> Result<(User, Vault)> {
        // Fast path for a friendly message; the unique constraints decide.
        if self.get_by_email(&req.email).await?.is_some() {
            return Err(Error::Conflict(EMAIL_TAKEN.to_string()));
        }
        if self.get_by_username(&req.username).await?.is_some() {
            return Err(Error::Conflict(USERNAME_TAKEN.to_string()));
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let (user, vault) = self.create_with_default_vault_tx(&mut tx, req).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "users",
            op = "create",
            user_id = user.id,
            vault_id = vault.id,
            is_guest = user.is_guest,
            "Created user with default vault"
        );
        Ok((user, vault))
    }

    async fn get(&self, id: i64) -> Result<Option<User>> {
        sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn touch_last_login(&self, id: i64) -> Result<()> {
        let result = sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("User not found".to_string()));
        }
        debug!(
            subsystem = "database",
            component = "users",
            op = "touch_last_login",
            user_id = id,
            "Recorded login"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_user_constraint() {
        assert_eq!(describe_user_constraint("users_email_key"), EMAIL_TAKEN);
        assert_eq!(describe_user_constraint("users_username_key"), USERNAME_TAKEN);
        assert!(describe_user_constraint("users_pkey").contains("users_pkey"));
    }
}
