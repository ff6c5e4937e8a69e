use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Lazily-initialized connection pool shared by all services
pub struct DatabaseManager {
    pool: Arc<RwLock<Option<PgPool>>>,
}

impl DatabaseManager {
    fn instance() -> &'static DatabaseManager {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<DatabaseManager> = OnceLock::new();
        INSTANCE.get_or_init(|| DatabaseManager {
            pool: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the shared pool, creating it on first use from DATABASE_URL
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        let manager = Self::instance();

        // Fast path: try read lock
        {
            let pool = manager.pool.read().await;
            if let Some(pool) = pool.as_ref() {
                return Ok(pool.clone());
            }
        }

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let db_config = &crate::config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(db_config.max_connections)
            .acquire_timeout(Duration::from_secs(db_config.connection_timeout))
            .connect(&database_url)
            .await?;

        {
            let mut slot = manager.pool.write().await;
            *slot = Some(pool.clone());
        }

        info!("Created database pool");
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Idempotent schema bootstrap: course -> module -> lesson hierarchy with
    /// cascading deletes, plus the per-(user, lesson) progress table.
    pub async fn migrate() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;

        let statements = [
            "CREATE TABLE IF NOT EXISTS courses (
                id BIGSERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                thumbnail_url TEXT,
                cover_image_url TEXT
            )",
            "CREATE TABLE IF NOT EXISTS modules (
                id BIGSERIAL PRIMARY KEY,
                course_id BIGINT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                summary TEXT,
                thumbnail_url TEXT,
                cover_image_url TEXT
            )",
            "CREATE TABLE IF NOT EXISTS lessons (
                id BIGSERIAL PRIMARY KEY,
                module_id BIGINT NOT NULL REFERENCES modules(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                lesson_type TEXT NOT NULL,
                content TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS lesson_progress (
                id BIGSERIAL PRIMARY KEY,
                lesson_id BIGINT NOT NULL REFERENCES lessons(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL,
                completed BOOLEAN NOT NULL DEFAULT FALSE,
                UNIQUE (user_id, lesson_id)
            )",
        ];

        for statement in statements {
            sqlx::query(statement).execute(&pool).await?;
        }

        info!("Database schema is up to date");
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close_all() {
        let manager = Self::instance();
        let mut slot = manager.pool.write().await;
        if let Some(pool) = slot.take() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}
