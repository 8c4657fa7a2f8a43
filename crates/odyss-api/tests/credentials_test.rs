//! Credential service against a real database.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p odyss-api -- --ignored

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt; // for `.oneshot()`

use odyss_api::{build_router, ApiError, AppState, CredentialService, ServerConfig};
use odyss_core::{UserRepository, VaultRepository};
use odyss_crypto::SessionTokens;
use odyss_db::test_fixtures::TestDatabase;

const TEST_KEY: &str = "credentials-test-signing-key";

async fn setup() -> (TestDatabase, CredentialService) {
    dotenvy::dotenv().ok();
    let test_db = TestDatabase::new().await;
    let credentials = CredentialService::new(test_db.db.clone(), SessionTokens::new(TEST_KEY));
    (test_db, credentials)
}

fn app(test_db: &TestDatabase, credentials: &CredentialService) -> axum::Router {
    build_router(
        AppState::new(test_db.db.clone(), credentials.clone()),
        &ServerConfig::default(),
    )
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn me(token: &str) -> Request<Body> {
    get_with_token("/auth/me", token)
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a PostgreSQL instance
async fn test_register_then_me_returns_user() {
    let (test_db, credentials) = setup().await;
    let router = app(&test_db, &credentials);

    let resp = router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"email": "a@x.com", "username": "alice", "password": "secret1"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user"]["username"], "alice");
    let token = body["access_token"].as_str().unwrap().to_string();

    let resp = router.clone().oneshot(me(&token)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let user = body_json(resp).await;
    assert_eq!(user["username"], "alice");
    assert_eq!(user["email"], "a@x.com");
    assert!(user.get("hashed_password").is_none());

    let user_id = user["id"].as_i64().unwrap();
    let vaults = test_db.db.vaults.list_for_owner(user_id).await.unwrap();
    assert_eq!(vaults.len(), 1);
    assert_eq!(vaults[0].name, "My Vault");
    assert!(vaults[0].is_default);

    let resp = router
        .clone()
        .oneshot(get_with_token(&format!("/vaults/{}", vaults[0].id), &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["name"], "My Vault");

    let (_, foreign) = test_db.user("bob").await;
    let resp = router
        .oneshot(get_with_token(&format!("/vaults/{}", foreign.id), &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a PostgreSQL instance
async fn test_login_records_last_login() {
    let (test_db, credentials) = setup().await;
    let registered = credentials
        .register("a@x.com", "alice", "secret1")
        .await
        .unwrap();
    assert!(registered.user.last_login.is_none());

    let session = credentials.login("a@x.com", "secret1").await.unwrap();
    assert_eq!(session.user.id, registered.user.id);
    assert!(credentials
        .resolve(&session.access_token)
        .await
        .unwrap()
        .is_some());

    let stored = test_db
        .db
        .users
        .get(registered.user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.last_login.is_some());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a PostgreSQL instance
async fn test_inactive_user_token_is_rejected() {
    let (test_db, credentials) = setup().await;
    let session = credentials
        .register("a@x.com", "alice", "secret1")
        .await
        .unwrap();

    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(session.user.id)
        .execute(&test_db.pool)
        .await
        .unwrap();

    assert!(credentials
        .resolve(&session.access_token)
        .await
        .unwrap()
        .is_none());
    assert!(credentials
        .authenticate("a@x.com", "secret1")
        .await
        .unwrap()
        .is_none());

    let resp = app(&test_db, &credentials)
        .oneshot(me(&session.access_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a PostgreSQL instance
async fn test_guest_gets_identity_and_vault() {
    let (test_db, credentials) = setup().await;
    let session = credentials.guest().await.unwrap();
    let user = &session.user;

    let suffix = user.username.strip_prefix("guest_").unwrap();
    assert_eq!(suffix.len(), 8);
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(user.email, format!("{}@odyssvault.local", user.username));
    assert!(user.is_guest);

    let vaults = test_db.db.vaults.list_for_owner(user.id).await.unwrap();
    assert_eq!(vaults.len(), 1);
    assert_eq!(vaults[0].name, "Guest Vault");
    assert!(vaults[0].is_default);

    let resolved = credentials
        .resolve(&session.access_token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.id, user.id);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a PostgreSQL instance
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let (test_db, credentials) = setup().await;
    credentials
        .register("a@x.com", "alice", "secret1")
        .await
        .unwrap();

    assert!(credentials
        .authenticate("a@x.com", "wrong-password")
        .await
        .unwrap()
        .is_none());
    assert!(credentials
        .authenticate("nobody@x.com", "secret1")
        .await
        .unwrap()
        .is_none());

    let wrong = credentials.login("a@x.com", "wrong-password").await;
    let unknown = credentials.login("nobody@x.com", "secret1").await;
    for result in [wrong, unknown] {
        match result {
            Err(ApiError::Unauthorized(msg)) => assert_eq!(msg, "Incorrect email or password"),
            other => panic!("expected Unauthorized, got {:?}", other.map(|s| s.user.id)),
        }
    }

    test_db.cleanup().await;
}
