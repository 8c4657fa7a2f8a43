//! Extractors that reject through [`ApiError`].
//!
//! axum's own `Json`, `Path` and `Query` answer malformed input with a plain
//! text body. These wrappers turn every such rejection into a 422 with the
//! usual `{"detail": ...}` body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::ApiError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Typed path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Typed query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
