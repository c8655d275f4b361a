use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::models::analytics::Analytics;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnalyticsRequest {
    // accepted for API compatibility; the aggregate is keyed by user only
    #[allow(dead_code)]
    pub test_id: Option<Uuid>,
    pub score: Option<i32>,
    pub total_marks: Option<i32>,
    pub time_taken: Option<i32>,
}

/// GET (or POST) /api/analytics - the caller's aggregate row
///
/// Lazily initialized: the first access creates the all-zero row. The no-op
/// conflict arm makes create-or-fetch a single atomic statement, so
/// concurrent first accesses still end up with one row per user.
pub async fn get_analytics(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Analytics>, ApiError> {
    let user_id = auth.user_id()?;

    let analytics = sqlx::query_as::<_, Analytics>(
        "INSERT INTO analytics (user_id) VALUES ($1)
         ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
         RETURNING *",
    )
    .bind(user_id)
    .fetch_one(state.db.pool())
    .await?;

    Ok(Json(analytics))
}

/// POST /api/analytics/update - fold one completed test into the aggregate
///
/// The increment and the derived-field recompute run inside a single UPDATE
/// so concurrent completions by the same user cannot lose updates. Accuracy
/// and averageScore are only recomputed when totalMarks is provided.
pub async fn update_analytics(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateAnalyticsRequest>,
) -> Result<Json<Analytics>, ApiError> {
    let user_id = auth.user_id()?;
    let score = payload.score.unwrap_or(0);
    let time_taken = payload.time_taken.unwrap_or(0);

    sqlx::query("INSERT INTO analytics (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(state.db.pool())
        .await?;

    let analytics = sqlx::query_as::<_, Analytics>(
        "UPDATE analytics SET
             total_tests = total_tests + 1,
             total_score = total_score + $2,
             total_time_spent = total_time_spent + $3,
             accuracy = CASE WHEN $4::integer IS NULL OR $4 <= 0 THEN accuracy
                 ELSE ((total_score + $2)::double precision / ((total_tests + 1) * $4)) * 100 END,
             average_score = CASE WHEN $4::integer IS NULL OR $4 <= 0 THEN average_score
                 ELSE (total_score + $2)::double precision / (total_tests + 1) END,
             updated_at = now()
         WHERE user_id = $1
         RETURNING *",
    )
    .bind(user_id)
    .bind(score)
    .bind(time_taken)
    .bind(payload.total_marks)
    .fetch_one(state.db.pool())
    .await?;

    Ok(Json(analytics))
}

/// Joined row for the recent-tests listing
#[derive(Debug, FromRow)]
struct RecentAttemptRow {
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
    test_difficulty: String,
    test_duration: i32,
    test_total_marks: i32,
    test_created_at: DateTime<Utc>,
}

/// GET /api/analytics/recent-tests - the caller's five most recent attempts
/// with their full parent test
pub async fn recent_tests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let user_id = auth.user_id()?;

    let rows = sqlx::query_as::<_, RecentAttemptRow>(
        "SELECT a.*,
                t.title AS test_title, t.section AS test_section,
                t.difficulty AS test_difficulty, t.duration AS test_duration,
                t.total_marks AS test_total_marks, t.created_at AS test_created_at
         FROM test_attempts a
         JOIN tests t ON t.id = a.test_id
         WHERE a.user_id = $1
         ORDER BY a.created_at DESC
         LIMIT 5",
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
                    "difficulty": row.test_difficulty,
                    "duration": row.test_duration,
                    "totalMarks": row.test_total_marks,
                    "createdAt": row.test_created_at,
                },
            })
        })
        .collect();

    Ok(Json(json!(attempts)))
}
