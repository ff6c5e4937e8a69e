use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseManager;
use crate::database::models::course::{Course, CourseWithModules, NewCourse};
use crate::database::models::lesson::Lesson;
use crate::database::models::module::{Module, ModuleWithLessons, NewModule};

use super::module_service::ModuleService;
use super::ServiceError;

pub struct CourseService {
    pool: PgPool,
}

impl CourseService {
    pub async fn new() -> Result<Self, ServiceError> {
        Ok(Self {
            pool: DatabaseManager::pool().await?,
        })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_course(&self, course: NewCourse) -> Result<Course, ServiceError> {
        if course.title.trim().is_empty() {
            return Err(ServiceError::Validation("Course title cannot be empty".to_string()));
        }

        let created: Course = sqlx::query_as(
            "INSERT INTO courses (title, description, thumbnail_url, cover_image_url) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.thumbnail_url)
        .bind(&course.cover_image_url)
        .fetch_one(&self.pool)
        .await?;

        info!("Created course {} ({})", created.id, created.title);
        Ok(created)
    }

    pub async fn list_courses(&self) -> Result<Vec<CourseWithModules>, ServiceError> {
        let courses: Vec<Course> = sqlx::query_as("SELECT * FROM courses ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(courses.len());
        for course in courses {
            out.push(self.assemble(course).await?);
        }
        Ok(out)
    }

    pub async fn get_course(&self, id: i64) -> Result<Option<CourseWithModules>, ServiceError> {
        let course: Option<Course> = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match course {
            Some(course) => Ok(Some(self.assemble(course).await?)),
            None => Ok(None),
        }
    }

    async fn assemble(&self, course: Course) -> Result<CourseWithModules, ServiceError> {
        let modules: Vec<Module> =
            sqlx::query_as("SELECT * FROM modules WHERE course_id = $1 ORDER BY id")
                .bind(course.id)
                .fetch_all(&self.pool)
                .await?;

        let mut with_lessons = Vec::with_capacity(modules.len());
        for module in modules {
            let lessons: Vec<Lesson> =
                sqlx::query_as("SELECT * FROM lessons WHERE module_id = $1 ORDER BY id")
                    .bind(module.id)
                    .fetch_all(&self.pool)
                    .await?;
            with_lessons.push(ModuleWithLessons { module, lessons });
        }

        Ok(CourseWithModules { course, modules: with_lessons })
    }

    /// Unweighted arithmetic mean of the per-module ratios: a one-lesson
    /// module counts the same as a ten-lesson module. This equal weighting is
    /// deliberate product behavior, not an aggregation shortcut.
    pub async fn course_progress(&self, course_id: i64, user_id: &str) -> Result<f64, ServiceError> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(ServiceError::NotFound(format!("Course not found: {}", course_id)));
        }

        let module_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM modules WHERE course_id = $1")
            .bind(course_id)
            .fetch_all(&self.pool)
            .await?;
        if module_ids.is_empty() {
            return Ok(0.0);
        }

        let modules = ModuleService::with_pool(self.pool.clone());
        let mut ratios = Vec::with_capacity(module_ids.len());
        for module_id in module_ids {
            ratios.push(modules.module_progress(module_id, user_id).await?);
        }

        Ok(mean(&ratios))
    }

    pub async fn add_module(&self, course_id: i64, module: NewModule) -> Result<Module, ServiceError> {
        if module.title.trim().is_empty() {
            return Err(ServiceError::Validation("Module title cannot be empty".to_string()));
        }

        // Existence check and insert commit together so a module can never be
        // half-linked to a course that disappeared mid-request.
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(ServiceError::NotFound(format!("Course not found: {}", course_id)));
        }

        let created: Module = sqlx::query_as(
            "INSERT INTO modules (course_id, title, summary, thumbnail_url, cover_image_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(course_id)
        .bind(&module.title)
        .bind(&module.summary)
        .bind(&module.thumbnail_url)
        .bind(&module.cover_image_url)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("Added module {} to course {}", created.id, course_id);
        Ok(created)
    }
}

/// Unweighted mean; 0.0 for an empty slice (module-less course).
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_course_means_zero_progress() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn modules_are_weighted_equally() {
        // One fully-completed single-lesson module plus one untouched
        // nine-lesson module averages to 0.5, not 1/10.
        assert_eq!(mean(&[1.0, 0.0]), 0.5);
        assert_eq!(mean(&[1.0, 0.5, 0.0]), 0.5);
        assert_eq!(mean(&[0.25]), 0.25);
    }
}
