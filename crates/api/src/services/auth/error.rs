//! Registration and login failures.

use thiserror::Error;

use fornecedores_core::EmailError;

use crate::db::RepositoryError;

/// Why a registration or login did not go through.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Unknown email or wrong password. Never says which.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("An account with this email already exists!")]
    EmailTaken,

    #[error("password: {0}")]
    WeakPassword(String),

    #[error("user store error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("password hashing failed")]
    PasswordHash,
}

impl AuthError {
    /// The request itself was refused: reported to the client in the failure
    /// envelope rather than as a status code.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidEmail(_) | Self::EmailTaken | Self::WeakPassword(_)
        )
    }

    /// A fault on the server side, not in the request.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Repository(_) | Self::PasswordHash)
    }
}
