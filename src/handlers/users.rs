use axum::{extract::State, response::Json};
use serde::Deserialize;

use crate::database::models::user::User;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
}

/// GET /api/users/profile - the caller's persisted record
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<User>, ApiError> {
    let user_id = auth.user_id()?;
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(state.db.pool())
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;
    Ok(Json(user))
}

/// PUT /api/users/profile - update the caller's display name
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    let user_id = auth.user_id()?;
    let name = payload
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::validation("Name is required"))?;

    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET name = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(user_id)
    .bind(&name)
    .fetch_optional(state.db.pool())
    .await?
    .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    Ok(Json(user))
}
