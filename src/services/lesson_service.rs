use sqlx::PgPool;
use tracing::info;

use crate::config::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::lesson::{Lesson, LessonType, NewLesson};
use crate::database::models::progress::LessonProgress;

use super::file_storage::{FileStorage, Upload};
use super::ServiceError;

/// Displayable payload of a lesson: inline text, or bytes pulled from the
/// content store with a fixed content-type label.
pub enum LessonContent {
    Text(String),
    File {
        bytes: Vec<u8>,
        content_type: &'static str,
        file_name: String,
    },
}

pub struct LessonService {
    pool: PgPool,
    storage: FileStorage,
}

impl LessonService {
    pub async fn new() -> Result<Self, ServiceError> {
        let pool = DatabaseManager::pool().await?;
        let storage = FileStorage::new(&config().storage.upload_dir)?;
        Ok(Self { pool, storage })
    }

    pub fn with(pool: PgPool, storage: FileStorage) -> Self {
        Self { pool, storage }
    }

    /// Validate and persist a new lesson. TEXT lessons keep the supplied text
    /// as their content token; file lessons store the upload first and keep
    /// the returned unique name. A file left orphaned by a later insert
    /// failure stays in the store (no compensation).
    pub async fn create_lesson(
        &self,
        module_id: i64,
        lesson: NewLesson,
        upload: Option<Upload>,
    ) -> Result<Lesson, ServiceError> {
        let content = match lesson.lesson_type {
            LessonType::Text => {
                let text = lesson.content.unwrap_or_default();
                if text.trim().is_empty() {
                    return Err(ServiceError::Validation(
                        "Text content is required for TEXT type lessons".to_string(),
                    ));
                }
                text
            }
            file_type => {
                let upload = match upload {
                    Some(upload) if !upload.bytes.is_empty() => upload,
                    _ => {
                        return Err(ServiceError::Validation(format!(
                            "File is required for {} type lessons",
                            file_type
                        )))
                    }
                };
                self.storage.store(&upload).await?
            }
        };

        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM modules WHERE id = $1")
            .bind(module_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(ServiceError::NotFound(format!("Module not found: {}", module_id)));
        }

        let created: Lesson = sqlx::query_as(
            "INSERT INTO lessons (module_id, title, lesson_type, content) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(module_id)
        .bind(&lesson.title)
        .bind(lesson.lesson_type)
        .bind(&content)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("Created {} lesson {} in module {}", created.lesson_type, created.id, module_id);
        Ok(created)
    }

    pub async fn get_lesson(&self, id: i64) -> Result<Option<Lesson>, ServiceError> {
        Ok(sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Record completion for one user on one lesson. Strictly one-directional
    /// and idempotent: repeating the call leaves exactly one row behind.
    pub async fn mark_complete(
        &self,
        lesson_id: i64,
        user_id: &str,
    ) -> Result<LessonProgress, ServiceError> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM lessons WHERE id = $1")
            .bind(lesson_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(ServiceError::NotFound(format!("Lesson not found: {}", lesson_id)));
        }

        let progress: LessonProgress = sqlx::query_as(
            "INSERT INTO lesson_progress (lesson_id, user_id, completed) VALUES ($1, $2, TRUE) \
             ON CONFLICT (user_id, lesson_id) DO UPDATE SET completed = TRUE RETURNING *",
        )
        .bind(lesson_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(progress)
    }

    /// Dispatch on lesson type: TEXT returns the stored token verbatim, the
    /// file types resolve it through the content store. A lesson whose token
    /// names a file the store no longer has surfaces as NotFound here; that
    /// inconsistency is never papered over with a substitute payload.
    pub async fn resolve_content(&self, lesson_id: i64) -> Result<LessonContent, ServiceError> {
        let lesson = self
            .get_lesson(lesson_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Lesson not found: {}", lesson_id)))?;

        if lesson.lesson_type == LessonType::Text {
            return Ok(LessonContent::Text(lesson.content));
        }

        let bytes = self.storage.read(&lesson.content).await?;
        Ok(LessonContent::File {
            bytes,
            content_type: lesson.lesson_type.file_content_type(),
            file_name: lesson.content,
        })
    }
}
