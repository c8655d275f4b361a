use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::test::{PublicQuestion, Test, TestWithCount};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestRequest {
    pub title: String,
    pub section: String,
    pub difficulty: String,
    pub duration: i32,
    pub total_marks: i32,
    #[serde(default)]
    pub questions: Vec<CreateQuestionRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    pub question_text: String,
    pub options: Value,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub marks: i32,
}

/// GET /api/tests - all tests newest-first, each with its question count
pub async fn list_tests(State(state): State<AppState>) -> Result<Json<Vec<TestWithCount>>, ApiError> {
    let tests = sqlx::query_as::<_, TestWithCount>(
        "SELECT t.*, count(q.id) AS question_count
         FROM tests t LEFT JOIN questions q ON q.test_id = t.id
         GROUP BY t.id
         ORDER BY t.created_at DESC",
    )
    .fetch_all(state.db.pool())
    .await?;
    Ok(Json(tests))
}

/// GET /api/tests/:id - one test with its questions
///
/// Questions go out through the public projection, so the correct answer
/// never reaches test takers.
pub async fn get_test(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let test = sqlx::query_as::<_, Test>("SELECT * FROM tests WHERE id = $1")
        .bind(id)
        .fetch_optional(state.db.pool())
        .await?
        .ok_or_else(|| ApiError::not_found("Test not found"))?;

    let questions = sqlx::query_as::<_, PublicQuestion>(
        "SELECT id, question_text, options, marks, explanation
         FROM questions WHERE test_id = $1",
    )
    .bind(id)
    .fetch_all(state.db.pool())
    .await?;

    let mut body = serde_json::to_value(&test)
        .map_err(|e| {
            tracing::error!("serialization failed: {}", e);
            ApiError::internal("Failed to format response")
        })?;
    body["questions"] = json!(questions);
    Ok(Json(body))
}

/// POST /api/tests - create a test together with its questions (admin action)
pub async fn create_test(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<CreateTestRequest>,
) -> Result<(StatusCode, Json<Test>), ApiError> {
    let mut tx = state.db.pool().begin().await?;

    let test = sqlx::query_as::<_, Test>(
        "INSERT INTO tests (title, section, difficulty, duration, total_marks)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(&payload.title)
    .bind(&payload.section)
    .bind(&payload.difficulty)
    .bind(payload.duration)
    .bind(payload.total_marks)
    .fetch_one(&mut *tx)
    .await?;

    for q in &payload.questions {
        sqlx::query(
            "INSERT INTO questions (test_id, question_text, options, correct_answer, explanation, marks)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(test.id)
        .bind(&q.question_text)
        .bind(&q.options)
        .bind(&q.correct_answer)
        .bind(&q.explanation)
        .bind(q.marks)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::info!("created test {} with {} questions", test.id, payload.questions.len());

    Ok((StatusCode::CREATED, Json(test)))
}
