//! Login and registration bodies.

use serde::{Deserialize, Serialize};
use validator::Validate;

use fornecedores_core::UserId;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
#[validate(schema(function = "passwords_match"))]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 8, max = 100, message = "must be between 8 and 100 characters"))]
    pub password: String,

    pub confirm_password: String,
}

fn passwords_match(request: &RegisterRequest) -> Result<(), validator::ValidationError> {
    if request.password == request.confirm_password {
        return Ok(());
    }
    Err(validator::ValidationError::new("must_match")
        .with_message("confirmPassword: passwords do not match".into()))
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// The logged-in user, as returned by register and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDto {
    pub id: UserId,
    pub email: String,
}
