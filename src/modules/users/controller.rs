use anyhow::anyhow;
use axum::{Json, extract::State};
use passgate_core::AppError;
use passgate_models::UserResponse;
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "Unauthorized - missing, invalid or expired token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse),
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let profile = state
        .auth
        .find_user(auth_user.user_id())
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

    Ok(Json(profile))
}
