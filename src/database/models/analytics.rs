use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-user rolling aggregate, exactly one row per user, created lazily on
/// first access. Totals only ever grow; accuracy and average_score are
/// recomputed from the updated totals inside the same UPDATE statement.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_tests: i32,
    pub total_score: i32,
    pub total_time_spent: i32,
    pub accuracy: f64,
    pub average_score: f64,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate arithmetic shared with the SQL update expression; kept as a
/// plain function so the math is testable without a database.
pub fn recompute(
    total_tests: i32,
    total_score: i32,
    total_marks: Option<i32>,
    prev_accuracy: f64,
    prev_average: f64,
) -> (f64, f64) {
    match total_marks {
        Some(marks) if marks > 0 && total_tests > 0 => {
            let accuracy =
                (total_score as f64 / (total_tests as f64 * marks as f64)) * 100.0;
            let average = total_score as f64 / total_tests as f64;
            (accuracy, average)
        }
        // Without totalMarks the derived fields are left untouched
        _ => (prev_accuracy, prev_average),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_completion_sets_both_derived_fields() {
        // totals after incrementing from the all-zero row with score 80
        let (accuracy, average) = recompute(1, 80, Some(100), 0.0, 0.0);
        assert_eq!(accuracy, 80.0);
        assert_eq!(average, 80.0);
    }

    #[test]
    fn second_completion_recomputes_from_new_totals() {
        // totals after a second update with score 60: 2 tests, 140 points
        let (accuracy, average) = recompute(2, 140, Some(100), 80.0, 80.0);
        assert_eq!(accuracy, 70.0);
        assert_eq!(average, 70.0);
    }

    #[test]
    fn missing_total_marks_leaves_derived_fields_unchanged() {
        let (accuracy, average) = recompute(3, 200, None, 66.5, 66.5);
        assert_eq!(accuracy, 66.5);
        assert_eq!(average, 66.5);
    }
}
