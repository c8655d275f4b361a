use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::study_material::StudyMaterial;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudyMaterialRequest {
    pub title: String,
    pub section: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
}

/// GET /api/study-materials - all materials, newest-first
pub async fn list_materials(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudyMaterial>>, ApiError> {
    let materials =
        sqlx::query_as::<_, StudyMaterial>("SELECT * FROM study_materials ORDER BY created_at DESC")
            .fetch_all(state.db.pool())
            .await?;
    Ok(Json(materials))
}

/// GET /api/study-materials/section/:section
pub async fn list_materials_by_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> Result<Json<Vec<StudyMaterial>>, ApiError> {
    let materials = sqlx::query_as::<_, StudyMaterial>(
        "SELECT * FROM study_materials WHERE section = $1 ORDER BY created_at DESC",
    )
    .bind(&section)
    .fetch_all(state.db.pool())
    .await?;
    Ok(Json(materials))
}

/// GET /api/study-materials/:id
pub async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StudyMaterial>, ApiError> {
    let material = sqlx::query_as::<_, StudyMaterial>("SELECT * FROM study_materials WHERE id = $1")
        .bind(id)
        .fetch_optional(state.db.pool())
        .await?
        .ok_or_else(|| ApiError::not_found("Study material not found"))?;
    Ok(Json(material))
}

/// POST /api/study-materials - add a material
pub async fn create_material(
    State(state): State<AppState>,
    Json(payload): Json<CreateStudyMaterialRequest>,
) -> Result<(StatusCode, Json<StudyMaterial>), ApiError> {
    let material = sqlx::query_as::<_, StudyMaterial>(
        "INSERT INTO study_materials (title, section, content, file_url)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&payload.title)
    .bind(&payload.section)
    .bind(&payload.content)
    .bind(&payload.file_url)
    .fetch_one(state.db.pool())
    .await?;

    Ok((StatusCode::CREATED, Json(material)))
}
