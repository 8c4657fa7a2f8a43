//! Core data models for the Odyss notes service.
//!
//! These types are shared across all crates and represent the core domain
//! entities. Row types derive `sqlx::FromRow` so repositories can map query
//! results directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults::NOTE_FILE_EXTENSION;

// =============================================================================
// USER TYPES
// =============================================================================

/// An account. Owns zero or more vaults.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    /// Never leaves the service.
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    pub is_active: bool,
    pub is_guest: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

// =============================================================================
// VAULT TYPES
// =============================================================================

/// A named, owner-scoped collection of folders and notes.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vault {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    /// The vault created with the account; cannot be deleted.
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// FOLDER TYPES
// =============================================================================

/// A folder. Folders nest through `parent_id` and are optionally vault-scoped.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Folder {
    pub id: i64,
    pub name: String,
    /// Parent folder (None = root). May point at a deleted folder, see
    /// `FolderRepository::delete`.
    pub parent_id: Option<i64>,
    pub vault_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A note row without its link sets.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub folder_id: Option<i64>,
    pub vault_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Derived filename, e.g. `Idea.od`.
    pub fn filename(&self) -> String {
        format!("{}.{}", self.title, NOTE_FILE_EXTENSION)
    }
}

/// Compact reference to a linked note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NoteLinkInfo {
    pub id: i64,
    pub title: String,
}

/// A note together with its outbound and inbound link sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteFull {
    #[serde(flatten)]
    pub note: Note,
    pub filename: String,
    /// Notes this note references through `[[Title]]`.
    pub links_to: Vec<NoteLinkInfo>,
    /// Notes whose content references this note.
    pub linked_from: Vec<NoteLinkInfo>,
}

impl NoteFull {
    pub fn new(note: Note, links_to: Vec<NoteLinkInfo>, linked_from: Vec<NoteLinkInfo>) -> Self {
        Self {
            filename: note.filename(),
            note,
            links_to,
            linked_from,
        }
    }
}

// =============================================================================
// VERSION TYPES
// =============================================================================

/// Immutable snapshot of a note's title and content before an overwrite.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NoteVersion {
    pub id: i64,
    pub note_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// GRAPH TYPES
// =============================================================================

/// A graph node: one per note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GraphNode {
    pub id: i64,
    pub title: String,
    pub folder_id: Option<i64>,
}

/// A directed edge for one resolved outbound link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GraphEdge {
    pub source: i64,
    pub target: i64,
}

/// Nodes and edges view of the link graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_note(title: &str) -> Note {
        let now = Utc::now();
        Note {
            id: 1,
            title: title.to_string(),
            content: String::new(),
            folder_id: None,
            vault_id: Some(1),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_note_filename() {
        assert_eq!(sample_note("Idea").filename(), "Idea.od");
    }

    #[test]
    fn test_note_full_serializes_flat() {
        let full = NoteFull::new(
            sample_note("Plan"),
            vec![NoteLinkInfo {
                id: 2,
                title: "Idea".to_string(),
            }],
            vec![],
        );
        let json = serde_json::to_value(&full).unwrap();
        assert_eq!(json["title"], "Plan");
        assert_eq!(json["filename"], "Plan.od");
        assert_eq!(json["links_to"][0]["id"], 2);
        assert!(json["linked_from"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_user_never_serializes_password_hash() {
        let user = User {
            id: 7,
            email: "a@x.com".to_string(),
            username: "alice".to_string(),
            hashed_password: "$argon2id$secret".to_string(),
            is_active: true,
            is_guest: false,
            created_at: Utc::now(),
            last_login: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("last_login"));
    }
}
