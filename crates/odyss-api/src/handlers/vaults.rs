//! Owner-scoped vault endpoints. All require a bearer token.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use odyss_core::{Vault, VaultRepository};

use super::MessageResponse;
use crate::auth::RequireUser;
use crate::extract::{ApiJson, ApiPath};
use crate::{validation, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateVaultBody {
    pub name: String,
}

pub async fn list_vaults(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Vault>>, ApiError> {
    let vaults = state.db.vaults.list_for_owner(user.id).await?;
    Ok(Json(vaults))
}

/// Create a vault for the caller.
///
/// # Returns
/// - 201 Created with the vault
/// - 403 Forbidden once the owner holds the maximum number of vaults
pub async fn create_vault(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(body): ApiJson<CreateVaultBody>,
) -> Result<(StatusCode, Json<Vault>), ApiError> {
    validation::name("name", &body.name)?;
    let vault = state.db.vaults.create(user.id, &body.name).await?;
    Ok((StatusCode::CREATED, Json(vault)))
}

/// Fetch one of the caller's vaults.
///
/// # Returns
/// - 200 OK with the vault
/// - 404 Not Found if the vault does not exist or belongs to someone else
pub async fn get_vault(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vault>, ApiError> {
    state
        .db
        .vaults
        .get_for_owner(user.id, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Vault not found".to_string()))
}

/// Delete one of the caller's vaults with everything in it.
///
/// # Returns
/// - 200 OK
/// - 403 Forbidden for the default vault
/// - 404 Not Found if the vault does not exist or belongs to someone else
pub async fn delete_vault(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.db.vaults.delete(user.id, id).await?;
    Ok(Json(MessageResponse::new("Vault deleted")))
}
