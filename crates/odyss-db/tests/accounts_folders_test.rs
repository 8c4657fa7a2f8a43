//! Users, vault rules and the folder tree.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p odyss-db -- --ignored

use odyss_db::test_fixtures::TestDatabase;
use odyss_db::{
    CreateFolderRequest, CreateNoteRequest, CreateUserRequest, Error, FolderRepository,
    NoteRepository, UpdateFolderRequest, UserRepository, VaultRepository,
};

/// Load `.env` so `DATABASE_URL` can live there.
async fn setup() -> TestDatabase {
    dotenvy::dotenv().ok();
    TestDatabase::new().await
}

fn signup(email: &str, username: &str) -> CreateUserRequest {
    CreateUserRequest {
        email: email.to_string(),
        username: username.to_string(),
        hashed_password: "hash".to_string(),
        is_guest: false,
        default_vault_name: "My Vault".to_string(),
    }
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a PostgreSQL instance
async fn test_registration_creates_default_vault() {
    let test_db = setup().await;
    let (user, vault) = test_db
        .db
        .users
        .create_with_default_vault(signup("a@x.com", "alice"))
        .await
        .unwrap();

    assert!(user.is_active);
    assert!(!user.is_guest);
    assert!(vault.is_default);
    assert_eq!(vault.owner_id, user.id);
    assert_eq!(vault.name, "My Vault");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a PostgreSQL instance
async fn test_duplicate_email_and_username_conflict() {
    let test_db = setup().await;
    let users = &test_db.db.users;
    users
        .create_with_default_vault(signup("a@x.com", "alice"))
        .await
        .unwrap();

    let dup_email = users
        .create_with_default_vault(signup("a@x.com", "other"))
        .await;
    assert!(matches!(dup_email, Err(Error::Conflict(msg)) if msg == "Email already registered"));

    let dup_name = users
        .create_with_default_vault(signup("b@x.com", "alice"))
        .await;
    assert!(matches!(dup_name, Err(Error::Conflict(msg)) if msg == "Username already taken"));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a PostgreSQL instance
async fn test_touch_last_login() {
    let test_db = setup().await;
    let (user, _) = test_db.user("alice").await;
    assert!(user.last_login.is_none());

    test_db.db.users.touch_last_login(user.id).await.unwrap();
    let reloaded = test_db.db.users.get(user.id).await.unwrap().unwrap();
    assert!(reloaded.last_login.is_some());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a PostgreSQL instance
async fn test_vault_cap_and_default_protection() {
    let test_db = setup().await;
    let (user, default_vault) = test_db.user("alice").await;
    let vaults = &test_db.db.vaults;

    let second = vaults.create(user.id, "Work").await.unwrap();
    vaults.create(user.id, "Play").await.unwrap();

    let fourth = vaults.create(user.id, "Too many").await;
    assert!(matches!(fourth, Err(Error::Forbidden(_))));

    let protected = vaults.delete(user.id, default_vault.id).await;
    assert!(
        matches!(protected, Err(Error::Forbidden(msg)) if msg == "Cannot delete default vault")
    );

    vaults.delete(user.id, second.id).await.unwrap();
    assert_eq!(vaults.list_for_owner(user.id).await.unwrap().len(), 2);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a PostgreSQL instance
async fn test_vaults_are_owner_scoped() {
    let test_db = setup().await;
    let (alice, alice_vault) = test_db.user("alice").await;
    let (bob, _) = test_db.user("bob").await;
    let extra = test_db.db.vaults.create(alice.id, "Work").await.unwrap();

    assert!(test_db
        .db
        .vaults
        .get_for_owner(bob.id, alice_vault.id)
        .await
        .unwrap()
        .is_none());
    let result = test_db.db.vaults.delete(bob.id, extra.id).await;
    assert!(matches!(result, Err(Error::NotFound(msg)) if msg == "Vault not found"));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a PostgreSQL instance
async fn test_vault_delete_cascades() {
    let test_db = setup().await;
    let (user, _) = test_db.user("alice").await;
    let vault = test_db.db.vaults.create(user.id, "Scratch").await.unwrap();

    let folder = test_db
        .db
        .folders
        .create(CreateFolderRequest {
            name: "F".to_string(),
            parent_id: None,
            vault_id: Some(vault.id),
        })
        .await
        .unwrap();
    let note = test_db
        .db
        .notes
        .insert(CreateNoteRequest {
            title: "N".to_string(),
            content: String::new(),
            folder_id: Some(folder.id),
            vault_id: Some(vault.id),
        })
        .await
        .unwrap();

    test_db.db.vaults.delete(user.id, vault.id).await.unwrap();
    assert!(test_db.db.folders.get(folder.id).await.unwrap().is_none());
    assert!(matches!(
        test_db.db.notes.fetch(note.note.id).await,
        Err(Error::NotFound(_))
    ));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a PostgreSQL instance
async fn test_folder_delete_detaches_notes_and_orphans_children() {
    let test_db = setup().await;
    let (_, vault) = test_db.user("alice").await;
    let folders = &test_db.db.folders;

    let parent = folders
        .create(CreateFolderRequest {
            name: "Parent".to_string(),
            parent_id: None,
            vault_id: Some(vault.id),
        })
        .await
        .unwrap();
    let child = folders
        .create(CreateFolderRequest {
            name: "Child".to_string(),
            parent_id: Some(parent.id),
            vault_id: Some(vault.id),
        })
        .await
        .unwrap();
    let note = test_db
        .db
        .notes
        .insert(CreateNoteRequest {
            title: "Inside".to_string(),
            content: String::new(),
            folder_id: Some(parent.id),
            vault_id: Some(vault.id),
        })
        .await
        .unwrap();

    folders.delete(parent.id).await.unwrap();

    let note = test_db.db.notes.fetch(note.note.id).await.unwrap();
    assert_eq!(note.note.folder_id, None);

    let child = folders.get(child.id).await.unwrap().unwrap();
    assert_eq!(child.parent_id, Some(parent.id));

    assert!(matches!(folders.delete(parent.id).await, Err(Error::NotFound(_))));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a PostgreSQL instance
async fn test_folder_update_rejects_cycles() {
    let test_db = setup().await;
    let (_, vault) = test_db.user("alice").await;
    let folders = &test_db.db.folders;

    let mk = |name: &str, parent_id: Option<i64>| CreateFolderRequest {
        name: name.to_string(),
        parent_id,
        vault_id: Some(vault.id),
    };
    let a = folders.create(mk("A", None)).await.unwrap();
    let b = folders.create(mk("B", Some(a.id))).await.unwrap();
    let c = folders.create(mk("C", Some(b.id))).await.unwrap();

    let own = folders
        .update(
            a.id,
            UpdateFolderRequest {
                name: None,
                parent_id: Some(a.id),
            },
        )
        .await;
    assert!(matches!(own, Err(Error::InvalidInput(_))));

    let into_descendant = folders
        .update(
            a.id,
            UpdateFolderRequest {
                name: None,
                parent_id: Some(c.id),
            },
        )
        .await;
    assert!(matches!(into_descendant, Err(Error::InvalidInput(_))));

    let renamed = folders
        .update(
            c.id,
            UpdateFolderRequest {
                name: Some("C2".to_string()),
                parent_id: Some(0),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "C2");
    assert_eq!(renamed.parent_id, None);

    // Now that C is at the root, A may move under it.
    let moved = folders
        .update(
            a.id,
            UpdateFolderRequest {
                name: None,
                parent_id: Some(c.id),
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.parent_id, Some(c.id));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a PostgreSQL instance
async fn test_folder_create_with_non_positive_parent_is_root() {
    let test_db = setup().await;
    let (_, vault) = test_db.user("alice").await;
    let folders = &test_db.db.folders;

    for parent_id in [Some(0), Some(-1), None] {
        let folder = folders
            .create(CreateFolderRequest {
                name: "Inbox".to_string(),
                parent_id,
                vault_id: Some(vault.id),
            })
            .await
            .unwrap();
        assert_eq!(folder.parent_id, None);
    }

    let missing = folders
        .create(CreateFolderRequest {
            name: "Orphan".to_string(),
            parent_id: Some(999_999),
            vault_id: Some(vault.id),
        })
        .await;
    assert!(missing.is_err());

    test_db.cleanup().await;
}
