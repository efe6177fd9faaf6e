//! Session login, registration and logout.

use axum::{Router, extract::State, http::StatusCode, routing::post};
use tower_sessions::Session;
use tracing::instrument;
use validator::Validate;

use super::Payload;
use crate::dto::{LoginRequest, RegisterRequest, UserDto, validation_messages};
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::notification::ApiResponse;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Register a new user and log them in.
#[instrument(skip_all)]
async fn register(
    State(state): State<AppState>,
    session: Session,
    Payload(request): Payload<RegisterRequest>,
) -> Result<ApiResponse<UserDto>> {
    if let Err(errors) = request.validate() {
        return Ok(ApiResponse::Failure(validation_messages(&errors)));
    }

    // A taken email or weak password comes back as the failure envelope.
    let user = state
        .auth_service()
        .register_with_password(&request.email, &request.password)
        .await?;

    start_session(&session, &user).await?;
    Ok(ApiResponse::Success(user_dto(&user)))
}

#[instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Payload(request): Payload<LoginRequest>,
) -> Result<ApiResponse<UserDto>> {
    if let Err(errors) = request.validate() {
        return Ok(ApiResponse::Failure(validation_messages(&errors)));
    }

    let user = state
        .auth_service()
        .login_with_password(&request.email, &request.password)
        .await?;

    start_session(&session, &user).await?;
    Ok(ApiResponse::Success(user_dto(&user)))
}

#[instrument(skip_all)]
async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
    };
    set_current_user(session, &current).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "user logged in");
    Ok(())
}

fn user_dto(user: &User) -> UserDto {
    UserDto {
        id: user.id,
        email: user.email.to_string(),
    }
}
