//! # odyss-db
//!
//! PostgreSQL database layer for the Odyss notes service.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for users, vaults, folders, notes, links and
//!   note history
//! - Transactional link recomputation and version snapshots on note writes
//! - Schema migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use odyss_db::{Database, NoteRepository, CreateNoteRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/odyss").await?;
//!     db.migrate().await?;
//!
//!     let note = db.notes.insert(CreateNoteRequest {
//!         title: "Idea".to_string(),
//!         content: "See [[Plan]]".to_string(),
//!         ..Default::default()
//!     }).await?;
//!
//!     println!("Created note: {}", note.note.id);
//!     Ok(())
//! }
//! ```
pub mod folders;
pub mod links;
pub mod notes;
pub mod pool;
pub mod users;
pub mod vaults;
pub mod versioning;

// Test fixtures for integration tests
// Always compiled so integration tests (in tests/) can use them
pub mod test_fixtures;

// Re-export core types
pub use odyss_core::*;

pub use folders::PgFolderRepository;
pub use links::PgLinkRepository;
pub use notes::PgNoteRepository;
pub use pool::{
    create_lazy_pool, create_pool, create_pool_with_config, log_pool_metrics, PoolConfig,
};
pub use users::PgUserRepository;
pub use vaults::PgVaultRepository;
pub use versioning::VersioningRepository;

/// SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Map a write error to the domain taxonomy.
///
/// Constraint violations become `Conflict` / `InvalidInput` carrying the
/// message returned by `describe` for the violated constraint name. Anything
/// else stays a database error.
pub(crate) fn constraint_error(e: sqlx::Error, describe: impl Fn(&str) -> String) -> Error {
    if let sqlx::Error::Database(db_err) = &e {
        let constraint = db_err.constraint().unwrap_or_default();
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return Error::Conflict(describe(constraint)),
            Some(FOREIGN_KEY_VIOLATION) => return Error::InvalidInput(describe(constraint)),
            _ => {}
        }
    }
    Error::Database(e)
}

/// Describe foreign-key violations on folder/note references.
pub(crate) fn describe_reference(constraint: &str) -> String {
    if constraint.ends_with("folder_id_fkey") {
        "Folder not found".to_string()
    } else if constraint.ends_with("vault_id_fkey") {
        "Vault not found".to_string()
    } else {
        format!("Constraint violated: {}", constraint)
    }
}

/// Combined database access.
#[derive(Clone)]
pub struct Database {
    pool: sqlx::Pool<sqlx::Postgres>,
    /// Accounts.
    pub users: PgUserRepository,
    /// Owner-scoped vaults.
    pub vaults: PgVaultRepository,
    /// Folder tree.
    pub folders: PgFolderRepository,
    /// Notes with transactional link recomputation.
    pub notes: PgNoteRepository,
    /// Link sets and graph view.
    pub links: PgLinkRepository,
    /// Note history.
    pub versions: VersioningRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            vaults: PgVaultRepository::new(pool.clone()),
            folders: PgFolderRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            links: PgLinkRepository::new(pool.clone()),
            versions: VersioningRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
