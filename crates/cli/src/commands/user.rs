//! API user management commands.
//!
//! # Usage
//!
//! ```bash
//! fornecedores-cli user create -e admin@example.com -p 'a long password'
//! ```

use fornecedores_api::db::PgUserRepository;
use fornecedores_api::services::AuthService;

use super::{CommandError, connect};

/// Create a login for the API.
///
/// # Errors
///
/// Returns an error if the email is invalid, the password is too short,
/// the email is taken, or the database is unreachable.
pub async fn create(email: &str, password: &str) -> Result<(), CommandError> {
    let pool = connect().await?;
    let users = PgUserRepository::new(pool);

    let user = AuthService::new(&users)
        .register_with_password(email, password)
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "User created");
    Ok(())
}
