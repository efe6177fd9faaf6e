//! User domain types.

use chrono::{DateTime, Utc};

use fornecedores_core::{Email, UserId};

/// A login identity.
///
/// The password hash is never part of this type; repositories return it
/// separately to the authentication service only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized login email.
    pub email: Email,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}
