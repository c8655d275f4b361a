use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETED: &str = "completed";

/// One user's run through a test. `in_progress` at creation, `completed`
/// once the client submits a final status update.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TestAttempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_id: Uuid,
    pub status: String,
    pub score: Option<i32>,
    pub time_taken: Option<i32>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAttempt {
    pub id: Uuid,
    pub test_attempt_id: Uuid,
    pub question_id: Uuid,
    pub selected_answer: Option<String>,
    pub is_correct: bool,
    pub time_taken: Option<i32>,
}

/// Reduced parent-test projection attached to each row of the per-user
/// attempt listing.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttemptTestSummary {
    pub id: Uuid,
    pub title: String,
    pub section: String,
    pub duration: i32,
}
