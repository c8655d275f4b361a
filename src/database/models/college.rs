use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Standalone directory record, unrelated to tests or attempts. Cutoff,
/// placements and diversity stay as free-form JSON since the source data
/// varies per college.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct College {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank_india: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placements: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diversity: Option<Value>,
    pub created_at: DateTime<Utc>,
}
