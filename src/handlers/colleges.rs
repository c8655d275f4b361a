use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::database::models::college::College;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollegeRequest {
    pub name: String,
    pub location: Option<String>,
    pub tier: Option<String>,
    pub rank_india: Option<i32>,
    pub cutoff: Option<Value>,
    pub placements: Option<Value>,
    pub diversity: Option<Value>,
}

/// GET /api/colleges - the full directory, name ascending
pub async fn list_colleges(State(state): State<AppState>) -> Result<Json<Vec<College>>, ApiError> {
    let colleges = sqlx::query_as::<_, College>("SELECT * FROM colleges ORDER BY name ASC")
        .fetch_all(state.db.pool())
        .await?;
    Ok(Json(colleges))
}

/// GET /api/colleges/:id
pub async fn get_college(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<College>, ApiError> {
    let college = sqlx::query_as::<_, College>("SELECT * FROM colleges WHERE id = $1")
        .bind(id)
        .fetch_optional(state.db.pool())
        .await?
        .ok_or_else(|| ApiError::not_found("College not found"))?;
    Ok(Json(college))
}

/// POST /api/colleges - add a directory entry
pub async fn create_college(
    State(state): State<AppState>,
    Json(payload): Json<CreateCollegeRequest>,
) -> Result<(StatusCode, Json<College>), ApiError> {
    let college = sqlx::query_as::<_, College>(
        "INSERT INTO colleges (name, location, tier, rank_india, cutoff, placements, diversity)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(&payload.name)
    .bind(&payload.location)
    .bind(&payload.tier)
    .bind(payload.rank_india)
    .bind(&payload.cutoff)
    .bind(&payload.placements)
    .bind(&payload.diversity)
    .fetch_one(state.db.pool())
    .await?;

    Ok((StatusCode::CREATED, Json(college)))
}
