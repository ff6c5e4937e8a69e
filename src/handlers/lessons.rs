use axum::extract::{Multipart, Path, Query};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::database::models::lesson::{LessonType, NewLesson};
use crate::error::ApiError;
use crate::services::file_storage::Upload;
use crate::services::lesson_service::{LessonContent, LessonService};

use super::ProgressQuery;

/// POST /lessons/modules/:moduleId - create a lesson from a multipart form
/// with fields: title, type, optional content (TEXT), optional file (others).
pub async fn lesson_create(
    Path(module_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut title: Option<String> = None;
    let mut lesson_type: Option<LessonType> = None;
    let mut content: Option<String> = None;
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart request: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "title" => title = Some(read_text(field).await?),
            "type" => {
                let raw = read_text(field).await?;
                lesson_type = Some(
                    raw.parse::<LessonType>()
                        .map_err(ApiError::bad_request)?,
                );
            }
            "content" => content = Some(read_text(field).await?),
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?
                    .to_vec();
                upload = Some(Upload { file_name, bytes });
            }
            _ => {}
        }
    }

    let title = title.ok_or_else(|| ApiError::bad_request("Lesson title is required"))?;
    let lesson_type =
        lesson_type.ok_or_else(|| ApiError::bad_request("Lesson type cannot be null"))?;

    let service = LessonService::new().await?;
    let lesson = service
        .create_lesson(module_id, NewLesson { title, lesson_type, content }, upload)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": true, "data": lesson }))))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart field: {}", e)))
}

/// GET /lessons/:id - fetch one lesson
pub async fn lesson_get(Path(id): Path<i64>) -> Result<impl IntoResponse, ApiError> {
    let service = LessonService::new().await?;
    let lesson = service
        .get_lesson(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Lesson not found: {}", id)))?;
    Ok(Json(json!({ "success": true, "data": lesson })))
}

/// POST /lessons/:id/progress?userId= - mark complete (idempotent upsert)
pub async fn lesson_complete(
    Path(id): Path<i64>,
    Query(query): Query<ProgressQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = LessonService::new().await?;
    let progress = service.mark_complete(id, &query.user_id).await?;
    Ok(Json(json!({ "success": true, "data": progress })))
}

/// GET /lessons/:id/content - text body for TEXT lessons, binary attachment
/// with Content-Disposition for file lessons.
pub async fn lesson_content(Path(id): Path<i64>) -> Result<Response, ApiError> {
    let service = LessonService::new().await?;

    match service.resolve_content(id).await? {
        LessonContent::Text(text) => Ok(text.into_response()),
        LessonContent::File { bytes, content_type, file_name } => {
            let headers = [
                (header::CONTENT_TYPE, content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file_name),
                ),
            ];
            Ok((headers, bytes).into_response())
        }
    }
}
