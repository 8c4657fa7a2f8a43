//! Credential service: login, registration, guest accounts and token
//! resolution on top of the user repository.

use tracing::{debug, info};
use uuid::Uuid;

use odyss_core::defaults::{
    DEFAULT_VAULT_NAME, GUEST_EMAIL_DOMAIN, GUEST_ID_LEN, GUEST_PREFIX, GUEST_VAULT_NAME,
};
use odyss_core::{CreateUserRequest, Result, User, UserRepository, Vault};
use odyss_crypto::{hash_password, random_secret, verify_password, SessionTokens};
use odyss_db::Database;

use crate::error::ApiError;

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

/// Guest identity: `guest_<8 hex>` and its synthetic email.
pub fn guest_identity() -> (String, String) {
    let id = Uuid::new_v4().simple().to_string();
    let username = format!("{}{}", GUEST_PREFIX, &id[..GUEST_ID_LEN]);
    let email = format!("{}@{}", username, GUEST_EMAIL_DOMAIN);
    (username, email)
}

#[derive(Clone)]
pub struct CredentialService {
    db: Database,
    tokens: SessionTokens,
}

impl CredentialService {
    pub fn new(db: Database, tokens: SessionTokens) -> Self {
        Self { db, tokens }
    }

    /// Check an email/password pair. `None` for an unknown email, a wrong
    /// password or an inactive account alike.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.db.users.get_by_email(email).await? else {
            return Ok(None);
        };
        if !user.is_active || !verify_password(password, &user.hashed_password) {
            debug!(
                subsystem = "auth",
                component = "credentials",
                op = "authenticate",
                "Credential check failed"
            );
            return Ok(None);
        }
        Ok(Some(user))
    }

    /// Verify credentials, record the login and issue a token.
    pub async fn login(&self, email: &str, password: &str) -> std::result::Result<Session, ApiError> {
        let user = self
            .authenticate(email, password)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Incorrect email or password".to_string()))?;

        self.db.users.touch_last_login(user.id).await?;
        info!(
            subsystem = "auth",
            component = "credentials",
            op = "login",
            user_id = user.id,
            "User logged in"
        );
        self.session_for(user)
    }

    /// Create an account with its default vault and issue a token.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> std::result::Result<Session, ApiError> {
        let hashed_password = hash_password(password)?;
        let (user, _vault) = self
            .create_account(CreateUserRequest {
                email: email.to_string(),
                username: username.to_string(),
                hashed_password,
                is_guest: false,
                default_vault_name: DEFAULT_VAULT_NAME.to_string(),
            })
            .await?;
        self.session_for(user)
    }

    /// Create a throwaway guest account with its own vault and issue a token.
    pub async fn guest(&self) -> std::result::Result<Session, ApiError> {
        let (username, email) = guest_identity();
        let hashed_password = hash_password(&random_secret(32))?;
        let (user, _vault) = self
            .create_account(CreateUserRequest {
                email,
                username,
                hashed_password,
                is_guest: true,
                default_vault_name: GUEST_VAULT_NAME.to_string(),
            })
            .await?;
        self.session_for(user)
    }

    async fn create_account(&self, req: CreateUserRequest) -> Result<(User, Vault)> {
        self.db.users.create_with_default_vault(req).await
    }

    /// Resolve a bearer token to an active user.
    pub async fn resolve(&self, token: &str) -> Result<Option<User>> {
        let Some(user_id) = self.tokens.resolve(token) else {
            return Ok(None);
        };
        let user = self.db.users.get(user_id).await?;
        Ok(user.filter(|u| u.is_active))
    }

    fn session_for(&self, user: User) -> std::result::Result<Session, ApiError> {
        let access_token = self.tokens.issue(user.id)?;
        Ok(Session { access_token, user })
    }
}
