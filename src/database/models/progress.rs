use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-(user, lesson) completion record. The unique index on
/// (user_id, lesson_id) makes completion an upsert, never an append.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub id: i64,
    pub lesson_id: i64,
    pub user_id: String,
    pub completed: bool,
}
