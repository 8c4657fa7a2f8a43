//! # odyss-api
//!
//! HTTP surface of the Odyss notes service: routing, bearer-token
//! extractors, request validation and error mapping.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod services;
pub mod validation;

use axum::{
    http::{header, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use odyss_db::Database;

pub use config::ServerConfig;
pub use error::ApiError;
pub use services::{CredentialService, Session};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub credentials: CredentialService,
}

impl AppState {
    pub fn new(db: Database, credentials: CredentialService) -> Self {
        Self { db, credentials }
    }
}

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the application router with its middleware stack.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    use handlers::{auth, folders, graph, health, notes, vaults, versions};

    Router::new()
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/guest", post(auth::guest))
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        // Vaults
        .route("/vaults", get(vaults::list_vaults).post(vaults::create_vault))
        .route("/vaults/:id", get(vaults::get_vault).delete(vaults::delete_vault))
        // Folders
        .route("/folders", get(folders::list_folders).post(folders::create_folder))
        .route(
            "/folders/:id",
            put(folders::update_folder).delete(folders::delete_folder),
        )
        // Notes
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/notes/:id/versions", get(versions::list_versions))
        .route(
            "/notes/:id/versions/:version_id/restore",
            post(versions::restore_version),
        )
        // Graph
        .route("/graph", get(graph::get_graph))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
