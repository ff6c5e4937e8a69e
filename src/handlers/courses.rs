use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::database::models::course::NewCourse;
use crate::database::models::module::NewModule;
use crate::error::ApiError;
use crate::services::course_service::CourseService;

use super::ProgressQuery;

/// POST /courses - create a course (title required)
pub async fn course_create(Json(body): Json<NewCourse>) -> Result<impl IntoResponse, ApiError> {
    let service = CourseService::new().await?;
    let course = service.create_course(body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "data": course }))))
}

/// GET /courses - list all courses with their module/lesson trees
pub async fn course_list() -> Result<impl IntoResponse, ApiError> {
    let service = CourseService::new().await?;
    let courses = service.list_courses().await?;
    Ok(Json(json!({ "success": true, "data": courses })))
}

/// GET /courses/:id - fetch one course
pub async fn course_get(Path(id): Path<i64>) -> Result<impl IntoResponse, ApiError> {
    let service = CourseService::new().await?;
    let course = service
        .get_course(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Course not found: {}", id)))?;
    Ok(Json(json!({ "success": true, "data": course })))
}

/// GET /courses/:id/progress?userId= - completion ratio in [0.0, 1.0]
pub async fn course_progress(
    Path(id): Path<i64>,
    Query(query): Query<ProgressQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = CourseService::new().await?;
    let progress = service.course_progress(id, &query.user_id).await?;
    Ok(Json(json!({ "success": true, "data": progress })))
}

/// POST /courses/:id/modules - append a module to an existing course
pub async fn module_create(
    Path(course_id): Path<i64>,
    Json(body): Json<NewModule>,
) -> Result<impl IntoResponse, ApiError> {
    let service = CourseService::new().await?;
    let module = service.add_module(course_id, body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "data": module }))))
}
