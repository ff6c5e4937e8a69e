use sqlx::PgPool;

use crate::database::manager::DatabaseManager;
use crate::database::models::lesson::Lesson;
use crate::database::models::module::{Module, ModuleWithLessons};

use super::ServiceError;

pub struct ModuleService {
    pool: PgPool,
}

impl ModuleService {
    pub async fn new() -> Result<Self, ServiceError> {
        Ok(Self {
            pool: DatabaseManager::pool().await?,
        })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_module(&self, id: i64) -> Result<Option<ModuleWithLessons>, ServiceError> {
        let module: Option<Module> = sqlx::query_as("SELECT * FROM modules WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(module) = module else {
            return Ok(None);
        };

        let lessons: Vec<Lesson> =
            sqlx::query_as("SELECT * FROM lessons WHERE module_id = $1 ORDER BY id")
                .bind(module.id)
                .fetch_all(&self.pool)
                .await?;

        Ok(Some(ModuleWithLessons { module, lessons }))
    }

    /// Completion ratio for one user over one module, recomputed from the
    /// backing store on every call. Lessons without a progress row count as
    /// incomplete: the denominator is the module's lesson count, not the
    /// number of progress rows found.
    pub async fn module_progress(&self, module_id: i64, user_id: &str) -> Result<f64, ServiceError> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM modules WHERE id = $1")
            .bind(module_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(ServiceError::NotFound(format!("Module not found: {}", module_id)));
        }

        let lesson_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM lessons WHERE module_id = $1")
            .bind(module_id)
            .fetch_all(&self.pool)
            .await?;
        if lesson_ids.is_empty() {
            return Ok(0.0);
        }

        let completed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM lesson_progress \
             WHERE user_id = $1 AND completed AND lesson_id = ANY($2)",
        )
        .bind(user_id)
        .bind(&lesson_ids)
        .fetch_one(&self.pool)
        .await?;

        Ok(completion_ratio(completed, lesson_ids.len()))
    }
}

/// completed / total. Callers guarantee total > 0.
pub(crate) fn completion_ratio(completed: i64, total: usize) -> f64 {
    completed as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_exact_fraction_of_lesson_count() {
        assert_eq!(completion_ratio(0, 4), 0.0);
        assert_eq!(completion_ratio(3, 4), 0.75);
        assert_eq!(completion_ratio(4, 4), 1.0);
        assert_eq!(completion_ratio(1, 10), 0.1);
    }
}
