//! Core traits for Odyss storage abstractions.
//!
//! These traits define the interfaces the PostgreSQL repositories satisfy,
//! keeping the HTTP layer independent of query details.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// USER REPOSITORY TRAITS
// =============================================================================

/// Request for creating an account.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    /// Already-hashed password (PHC string).
    pub hashed_password: String,
    pub is_guest: bool,
    /// Name of the default vault created alongside the account.
    pub default_vault_name: String,
}

/// Repository for accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user and its default vault in one transaction.
    ///
    /// Fails with `Conflict` when the email or username is already taken.
    async fn create_with_default_vault(&self, req: CreateUserRequest) -> Result<(User, Vault)>;

    /// Fetch a user by id.
    async fn get(&self, id: i64) -> Result<Option<User>>;

    /// Fetch a user by exact (case-sensitive) email.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Fetch a user by exact username.
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Record a successful login.
    async fn touch_last_login(&self, id: i64) -> Result<()>;
}

// =============================================================================
// VAULT REPOSITORY TRAITS
// =============================================================================

/// Repository for vaults. All operations are owner-scoped.
#[async_trait]
pub trait VaultRepository: Send + Sync {
    /// List the owner's vaults, oldest first.
    async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<Vault>>;

    /// Create a non-default vault, enforcing the per-owner cap.
    async fn create(&self, owner_id: i64, name: &str) -> Result<Vault>;

    /// Fetch a vault if it belongs to the owner.
    async fn get_for_owner(&self, owner_id: i64, id: i64) -> Result<Option<Vault>>;

    /// Delete a non-default vault with its folders and notes.
    async fn delete(&self, owner_id: i64, id: i64) -> Result<()>;
}

// =============================================================================
// FOLDER REPOSITORY TRAITS
// =============================================================================

/// Request for creating a folder.
#[derive(Debug, Clone, Default)]
pub struct CreateFolderRequest {
    pub name: String,
    /// A non-positive value creates the folder at the root.
    pub parent_id: Option<i64>,
    pub vault_id: Option<i64>,
}

impl CreateFolderRequest {
    /// The parent to store, with the same sentinels as an update.
    pub fn parent(&self) -> Option<i64> {
        match FolderChange::from_raw(self.parent_id) {
            FolderChange::MoveTo(id) => Some(id),
            FolderChange::Keep | FolderChange::Detach => None,
        }
    }
}

/// Request for updating a folder. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateFolderRequest {
    pub name: Option<String>,
    /// A non-positive value moves the folder to the root.
    pub parent_id: Option<i64>,
}

impl UpdateFolderRequest {
    /// Interpret the raw parent reference.
    pub fn parent_change(&self) -> FolderChange {
        FolderChange::from_raw(self.parent_id)
    }
}

/// Repository for folders.
#[async_trait]
pub trait FolderRepository: Send + Sync {
    /// List folders, optionally restricted to one vault.
    async fn list(&self, vault_id: Option<i64>) -> Result<Vec<Folder>>;

    /// Fetch a folder by id.
    async fn get(&self, id: i64) -> Result<Option<Folder>>;

    /// Create a folder.
    async fn create(&self, req: CreateFolderRequest) -> Result<Folder>;

    /// Rename and/or re-parent a folder. Rejects cycles.
    async fn update(&self, id: i64, req: UpdateFolderRequest) -> Result<Folder>;

    /// Delete a folder, detaching its notes first.
    ///
    /// Child folders are not cascaded: their `parent_id` keeps pointing at
    /// the removed id.
    async fn delete(&self, id: i64) -> Result<()>;
}

// =============================================================================
// NOTE REPOSITORY TRAITS
// =============================================================================

/// Request for listing notes.
#[derive(Debug, Clone, Default)]
pub struct ListNotesRequest {
    pub folder_id: Option<i64>,
    pub vault_id: Option<i64>,
}

/// Request for creating a new note.
#[derive(Debug, Clone, Default)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub folder_id: Option<i64>,
    pub vault_id: Option<i64>,
}

/// Request for updating a note. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Raw folder reference from the client: a non-positive value moves the
    /// note out of any folder.
    pub folder_id: Option<i64>,
}

/// What an update does to a folder reference (a note's folder or a folder's
/// parent).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderChange {
    Keep,
    Detach,
    MoveTo(i64),
}

impl FolderChange {
    /// `None` keeps, non-positive detaches, positive moves.
    pub fn from_raw(raw: Option<i64>) -> Self {
        match raw {
            None => FolderChange::Keep,
            Some(id) if id <= 0 => FolderChange::Detach,
            Some(id) => FolderChange::MoveTo(id),
        }
    }
}

impl UpdateNoteRequest {
    /// Interpret the raw folder reference.
    pub fn folder_change(&self) -> FolderChange {
        FolderChange::from_raw(self.folder_id)
    }

    /// The incoming title as it would be stored.
    pub fn trimmed_title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim)
    }

    /// Whether applying this update to `current` changes its title or content.
    ///
    /// Only such updates produce a version snapshot.
    pub fn changes_text_of(&self, current: &Note) -> bool {
        let title_changed = self
            .trimmed_title()
            .is_some_and(|title| title != current.title);
        let content_changed = self
            .content
            .as_deref()
            .is_some_and(|content| content != current.content);
        title_changed || content_changed
    }
}

/// Repository for note CRUD operations.
///
/// Every write recomputes the note's outbound links in the same transaction.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// List notes, most recently updated first.
    async fn list(&self, req: ListNotesRequest) -> Result<Vec<NoteFull>>;

    /// Fetch a note with its link sets.
    async fn fetch(&self, id: i64) -> Result<NoteFull>;

    /// Insert a new note (title trimmed) and resolve its links.
    async fn insert(&self, req: CreateNoteRequest) -> Result<NoteFull>;

    /// Update a note, snapshotting the previous text when it changes.
    async fn update(&self, id: i64, req: UpdateNoteRequest) -> Result<NoteFull>;

    /// Delete a note with its versions and links.
    async fn delete(&self, id: i64) -> Result<()>;
}

// =============================================================================
// VERSION REPOSITORY TRAITS
// =============================================================================

/// Note history.
#[async_trait]
pub trait VersionRepository: Send + Sync {
    /// All snapshots of a note, newest first. `NotFound` if the note is gone.
    async fn list_versions(&self, note_id: i64) -> Result<Vec<NoteVersion>>;

    /// Overwrite a note with one of its snapshots.
    ///
    /// The note's current text is snapshotted first, so a restore can itself
    /// be undone. `NotFound` unless the version belongs to the note.
    async fn restore_version(&self, note_id: i64, version_id: i64) -> Result<NoteFull>;
}

// =============================================================================
// LINK REPOSITORY TRAITS
// =============================================================================

/// Read side of the link graph.
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Nodes and edges, optionally restricted to one vault.
    async fn graph(&self, vault_id: Option<i64>) -> Result<GraphData>;
}
