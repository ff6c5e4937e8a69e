use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::lesson::Lesson;

/// Module row. Every module belongs to exactly one course.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub summary: Option<String>,
    pub thumbnail_url: Option<String>,
    pub cover_image_url: Option<String>,
}

/// Module with its owned lessons, as returned by the read endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleWithLessons {
    #[serde(flatten)]
    pub module: Module,
    pub lessons: Vec<Lesson>,
}

/// Request body for POST /courses/:id/modules
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewModule {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
}
