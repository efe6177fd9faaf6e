//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, AppError>`. Expected business failures are
//! recorded as notifications and returned in the response envelope; the one
//! exception is a refused registration, which reaches here as an
//! [`AuthError`] and is rendered as that same envelope. Otherwise what
//! remains is "not found", "not logged in", and infrastructure faults.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::notification::ApiResponse;
use crate::services::auth::AuthError;
use crate::storage::StorageError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Image could not be written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Malformed multipart body.
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// Resource not found. Answered with an empty body.
    #[error("Not found")]
    NotFound,

    /// User is not authenticated. Answered with an empty body.
    #[error("Unauthorized")]
    Unauthorized,

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(String),
}

impl AppError {
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Storage(_) | Self::Session(_) => true,
            Self::Auth(err) => err.is_server_error(),
            Self::Multipart(_) | Self::NotFound | Self::Unauthorized => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match self {
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Multipart(err) => (err.status(), err.body_text()).into_response(),
            Self::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED.into_response(),
            Self::Auth(err) if err.is_rejection() => {
                ApiResponse::<()>::Failure(vec![err.to_string()]).into_response()
            }
            // Don't expose internal error details to clients
            Self::Auth(_) | Self::Database(_) | Self::Storage(_) | Self::Session(_) => {
                internal_server_error()
            }
        }
    }
}

fn internal_server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Session(err.to_string())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn status_and_body(err: AppError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_and_unauthorized_have_empty_bodies() {
        assert_eq!(
            status_and_body(AppError::NotFound).await,
            (StatusCode::NOT_FOUND, String::new())
        );
        assert_eq!(
            status_and_body(AppError::Unauthorized).await,
            (StatusCode::UNAUTHORIZED, String::new())
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) = status_and_body(AppError::Database(
            RepositoryError::DataCorruption("bad kind 7".to_owned()),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal server error");
    }

    #[tokio::test]
    async fn test_auth_status_codes() {
        let (status, _) = status_and_body(AppError::Auth(AuthError::InvalidCredentials)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = status_and_body(AppError::Auth(AuthError::EmailTaken)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            r#"{"success":false,"errors":["An account with this email already exists!"]}"#
        );

        let (status, body) = status_and_body(AppError::Auth(AuthError::PasswordHash)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal server error");
    }
}
