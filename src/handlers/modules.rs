use axum::extract::{Path, Query};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::error::ApiError;
use crate::services::module_service::ModuleService;

use super::ProgressQuery;

/// GET /modules/:id - fetch a module with its lessons
pub async fn module_get(Path(id): Path<i64>) -> Result<impl IntoResponse, ApiError> {
    let service = ModuleService::new().await?;
    let module = service
        .get_module(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Module not found: {}", id)))?;
    Ok(Json(json!({ "success": true, "data": module })))
}

/// GET /modules/:id/progress?userId= - completion ratio in [0.0, 1.0]
pub async fn module_progress(
    Path(id): Path<i64>,
    Query(query): Query<ProgressQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = ModuleService::new().await?;
    let progress = service.module_progress(id, &query.user_id).await?;
    Ok(Json(json!({ "success": true, "data": progress })))
}
