pub mod course_service;
pub mod file_storage;
pub mod lesson_service;
pub mod module_service;

use thiserror::Error;

use crate::database::manager::DatabaseError;
use self::file_storage::StorageError;

/// Errors surfaced by the service layer. Mapped to HTTP statuses in
/// `crate::error`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
