use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::models::attempt::{
    QuestionAttempt, TestAttempt, STATUS_COMPLETED, STATUS_IN_PROGRESS,
};
use crate::database::models::test::Test;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttemptRequest {
    pub test_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttemptRequest {
    pub status: Option<String>,
    pub score: Option<i32>,
    pub time_taken: Option<i32>,
    pub question_attempts: Option<Vec<QuestionAttemptInput>>,
}

/// A submitted answer. Keyed by (attempt, question): first submission
/// inserts, later submissions for the same question overwrite.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAttemptInput {
    pub question_id: Uuid,
    pub selected_answer: Option<String>,
    #[serde(default)]
    pub is_correct: bool,
    pub time_taken: Option<i32>,
}

/// POST /api/test-attempts - start an attempt in `in_progress` state
pub async fn create_attempt(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateAttemptRequest>,
) -> Result<(StatusCode, Json<TestAttempt>), ApiError> {
    let user_id = auth.user_id()?;
    let test_id = payload
        .test_id
        .ok_or_else(|| ApiError::validation("testId is required"))?;

    let attempt = sqlx::query_as::<_, TestAttempt>(
        "INSERT INTO test_attempts (user_id, test_id, status) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user_id)
    .bind(test_id)
    .bind(STATUS_IN_PROGRESS)
    .fetch_one(state.db.pool())
    .await?;

    Ok((StatusCode::CREATED, Json(attempt)))
}

/// GET /api/test-attempts/:id - attempt with its answers and parent test
///
/// 404 for unknown attempts, 403 when the caller does not own the attempt.
pub async fn get_attempt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let user_id = auth.user_id()?;

    let attempt = fetch_owned_attempt(&state, id, user_id).await?;

    let question_attempts = sqlx::query_as::<_, QuestionAttempt>(
        "SELECT * FROM question_attempts WHERE test_attempt_id = $1",
    )
    .bind(id)
    .fetch_all(state.db.pool())
    .await?;

    let test = sqlx::query_as::<_, Test>("SELECT * FROM tests WHERE id = $1")
        .bind(attempt.test_id)
        .fetch_optional(state.db.pool())
        .await?;

    let mut body = attempt_json(&attempt)?;
    body["questionAttempts"] = json!(question_attempts);
    body["test"] = json!(test);
    Ok(Json(body))
}

/// PATCH /api/test-attempts/:id - partial update, plus answer upserts
///
/// Only the provided fields change; moving to `completed` stamps the
/// completion time server-side.
pub async fn update_attempt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAttemptRequest>,
) -> Result<Json<TestAttempt>, ApiError> {
    let user_id = auth.user_id()?;

    if let Some(status) = payload.status.as_deref() {
        if status != STATUS_IN_PROGRESS && status != STATUS_COMPLETED {
            return Err(ApiError::validation("Invalid status"));
        }
    }

    fetch_owned_attempt(&state, id, user_id).await?;

    let updated = sqlx::query_as::<_, TestAttempt>(
        "UPDATE test_attempts SET
             status = COALESCE($2, status),
             score = COALESCE($3, score),
             time_taken = COALESCE($4, time_taken),
             completed_at = CASE WHEN $2 = 'completed' THEN now() ELSE completed_at END
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&payload.status)
    .bind(payload.score)
    .bind(payload.time_taken)
    .fetch_one(state.db.pool())
    .await?;

    for qa in payload.question_attempts.unwrap_or_default() {
        sqlx::query(
            "INSERT INTO question_attempts
                 (test_attempt_id, question_id, selected_answer, is_correct, time_taken)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (test_attempt_id, question_id) DO UPDATE SET
                 selected_answer = EXCLUDED.selected_answer,
                 is_correct = EXCLUDED.is_correct,
                 time_taken = EXCLUDED.time_taken",
        )
        .bind(id)
        .bind(qa.question_id)
        .bind(&qa.selected_answer)
        .bind(qa.is_correct)
        .bind(qa.time_taken)
        .execute(state.db.pool())
        .await?;
    }

    Ok(Json(updated))
}

/// Joined row for the per-user attempt listing
#[derive(Debug, FromRow)]
struct UserAttemptRow {
    id: Uuid,
    user_id: Uuid,
    test_id: Uuid,
    status: String,
    score: Option<i32>,
    time_taken: Option<i32>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    test_title: String,
    test_section: String,
    test_duration: i32,
}

/// GET /api/test-attempts/user/attempts - the caller's attempts
/// newest-first, each with a reduced parent-test projection
pub async fn list_user_attempts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let user_id = auth.user_id()?;

    let rows = sqlx::query_as::<_, UserAttemptRow>(
        "SELECT a.*, t.title AS test_title, t.section AS test_section, t.duration AS test_duration
         FROM test_attempts a
         JOIN tests t ON t.id = a.test_id
         WHERE a.user_id = $1
         ORDER BY a.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(state.db.pool())
    .await?;

    let attempts: Vec<Value> = rows
        .into_iter()
        .map(|row| {
            json!({
                "id": row.id,
                "userId": row.user_id,
                "testId": row.test_id,
                "status": row.status,
                "score": row.score,
                "timeTaken": row.time_taken,
                "completedAt": row.completed_at,
                "createdAt": row.created_at,
                "test": {
                    "id": row.test_id,
                    "title": row.test_title,
                    "section": row.test_section,
                    "duration": row.test_duration,
                },
            })
        })
        .collect();

    Ok(Json(json!(attempts)))
}

/// Load an attempt, or fail with 404 / 403. Ownership is checked before any
/// read or write of the attempt's data.
async fn fetch_owned_attempt(
    state: &AppState,
    id: Uuid,
    user_id: Uuid,
) -> Result<TestAttempt, ApiError> {
    let attempt = sqlx::query_as::<_, TestAttempt>("SELECT * FROM test_attempts WHERE id = $1")
        .bind(id)
        .fetch_optional(state.db.pool())
        .await?
        .ok_or_else(|| ApiError::not_found("Test attempt not found"))?;

    if attempt.user_id != user_id {
        return Err(ApiError::forbidden("Unauthorized"));
    }
    Ok(attempt)
}

fn attempt_json(attempt: &TestAttempt) -> Result<Value, ApiError> {
    serde_json::to_value(attempt).map_err(|e| {
        tracing::error!("serialization failed: {}", e);
        ApiError::internal("Failed to format response")
    })
}
