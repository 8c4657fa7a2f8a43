//! HTTP error mapping.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// Errors returned by handlers and extractors.
///
/// Every variant renders as `{"detail": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Internal(odyss_core::Error),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl From<odyss_core::Error> for ApiError {
    fn from(err: odyss_core::Error) -> Self {
        use odyss_core::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            // Duplicate identities surface as 400.
            Error::Conflict(msg) | Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Forbidden(msg) => ApiError::Forbidden(msg),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            other @ (Error::Database(_) | Error::Internal(_)) => ApiError::Internal(other),
        }
    }
}

impl From<odyss_crypto::CryptoError> for ApiError {
    fn from(err: odyss_crypto::CryptoError) -> Self {
        ApiError::Internal(odyss_core::Error::Internal(err.to_string()))
    }
}

// Malformed request shape: bad JSON, missing fields, unparsable path or
// query values.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(err) => {
                tracing::error!(
                    subsystem = "api",
                    component = "error",
                    error = %err,
                    "Request failed"
                );
                "Internal server error".to_string()
            }
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Validation(msg) => msg,
        };

        let mut response = (
            status,
            Json(serde_json::json!({
                "detail": message,
            })),
        )
            .into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odyss_core::Error;

    #[test]
    fn test_core_error_status_mapping() {
        let cases = [
            (Error::NotFound("Note not found".into()), StatusCode::NOT_FOUND),
            (
                Error::Conflict("Email already registered".into()),
                StatusCode::BAD_REQUEST,
            ),
            (Error::InvalidInput("bad".into()), StatusCode::BAD_REQUEST),
            (Error::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (Error::Unauthorized("who".into()), StatusCode::UNAUTHORIZED),
            (Error::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                Error::Database(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_unauthorized_carries_challenge() {
        let response = ApiError::Unauthorized("Not authenticated".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_validation_is_422() {
        let response = ApiError::Validation("too short".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
