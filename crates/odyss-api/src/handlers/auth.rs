//! Account endpoints: registration, login, guest sessions and the current
//! user.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use odyss_core::User;

use super::MessageResponse;
use crate::auth::RequireUser;
use crate::extract::ApiJson;
use crate::services::Session;
use crate::{validation, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued session: `{access_token, token_type: "bearer", user}`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: User,
}

impl From<Session> for TokenResponse {
    fn from(session: Session) -> Self {
        Self {
            access_token: session.access_token,
            token_type: "bearer",
            user: session.user,
        }
    }
}

/// Create an account and its default vault.
///
/// # Returns
/// - 201 Created with a session
/// - 400 Bad Request if the email or username is taken
/// - 422 Unprocessable Entity on malformed fields
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    validation::email(&req.email)?;
    validation::username(&req.username)?;
    validation::password(&req.password)?;

    let session = state
        .credentials
        .register(&req.email, &req.username, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let session = state.credentials.login(&req.email, &req.password).await?;
    Ok(Json(session.into()))
}

/// Provision a guest account with its own vault.
pub async fn guest(State(state): State<AppState>) -> Result<Json<TokenResponse>, ApiError> {
    let session = state.credentials.guest().await?;
    Ok(Json(session.into()))
}

pub async fn me(RequireUser(user): RequireUser) -> Json<User> {
    Json(user)
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout(RequireUser(_user): RequireUser) -> Json<MessageResponse> {
    Json(MessageResponse::new("Logged out successfully"))
}
