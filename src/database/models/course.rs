use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::module::ModuleWithLessons;

/// Course row as stored. Modules are owned by the course and fetched by
/// `course_id`, so there is no back-reference cycle to special-case.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub cover_image_url: Option<String>,
}

/// Course with its full module/lesson tree, as returned by the read endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWithModules {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<ModuleWithLessons>,
}

/// Request body for POST /courses
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
}
