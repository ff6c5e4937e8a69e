use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// Errors from the content store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to store empty file")]
    EmptyUpload,

    #[error("Invalid file path sequence in filename: {0}")]
    InvalidPath(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Raw multipart upload handed to the content store.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Filesystem-backed content store for lesson assets. The storage root is an
/// explicit constructor argument; the configured default is `./uploads`.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(upload_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = upload_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        let root = root.canonicalize()?;
        Ok(Self { root })
    }

    /// Persist an upload under a collision-resistant name and return that
    /// name. Concurrent uploads sharing an original file name stay distinct
    /// because of the timestamp prefix; the exact-name collision that the
    /// prefix makes practically impossible is resolved by overwriting.
    pub async fn store(&self, upload: &Upload) -> Result<String, StorageError> {
        if upload.bytes.is_empty() {
            return Err(StorageError::EmptyUpload);
        }

        let cleaned = Self::clean_file_name(&upload.file_name)?;
        let stored_name = format!("{}_{}", chrono::Utc::now().timestamp_micros(), cleaned);
        let target = self.root.join(&stored_name);

        info!("Storing upload {} at {}", cleaned, target.display());
        tokio::fs::write(&target, &upload.bytes).await?;

        Ok(stored_name)
    }

    /// Read a stored file back as bytes. NotFound if the name does not
    /// resolve to a file under the storage root.
    pub async fn read(&self, stored_name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve_path(stored_name)?;
        Ok(tokio::fs::read(&path).await?)
    }

    /// Resolve a stored name to its path on disk, for callers that need a
    /// filesystem handle rather than the bytes.
    pub fn resolve_path(&self, stored_name: &str) -> Result<PathBuf, StorageError> {
        let cleaned = Self::clean_file_name(stored_name)
            .map_err(|_| StorageError::NotFound(stored_name.to_string()))?;
        let path = self.root.join(cleaned);
        if !path.is_file() {
            return Err(StorageError::NotFound(stored_name.to_string()));
        }
        Ok(path)
    }

    /// Normalize a client-supplied file name down to a single path component.
    /// Empty and `.` segments are dropped, `x/..` pairs cancel out, and any
    /// `..` left pointing above the root is rejected.
    fn clean_file_name(name: &str) -> Result<String, StorageError> {
        let mut parts: Vec<&str> = Vec::new();
        for part in name.split(['/', '\\']) {
            match part {
                "" | "." => {}
                ".." => {
                    if parts.pop().is_none() {
                        return Err(StorageError::InvalidPath(name.to_string()));
                    }
                }
                other => parts.push(other),
            }
        }

        match parts.last() {
            Some(file_name) => Ok((*file_name).to_string()),
            None => Err(StorageError::InvalidPath(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_root(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("lms-storage-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn rejects_parent_directory_traversal() {
        assert!(matches!(
            FileStorage::clean_file_name("../../etc/passwd"),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            FileStorage::clean_file_name("uploads/../../passwd"),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            FileStorage::clean_file_name("."),
            Err(StorageError::InvalidPath(_))
        ));
    }

    #[test]
    fn normalizes_harmless_segments() {
        assert_eq!(FileStorage::clean_file_name("notes.pdf").unwrap(), "notes.pdf");
        assert_eq!(FileStorage::clean_file_name("./a/notes.pdf").unwrap(), "notes.pdf");
        assert_eq!(FileStorage::clean_file_name("a/../notes.pdf").unwrap(), "notes.pdf");
    }

    #[tokio::test]
    async fn stores_and_reads_back_bytes() {
        let root = scratch_root("roundtrip");
        let storage = FileStorage::new(&root).unwrap();

        let upload = Upload {
            file_name: "notes.txt".to_string(),
            bytes: b"hello lessons".to_vec(),
        };
        let stored = storage.store(&upload).await.unwrap();
        assert!(stored.ends_with("_notes.txt"));

        let bytes = storage.read(&stored).await.unwrap();
        assert_eq!(bytes, b"hello lessons");

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn rejects_empty_upload() {
        let root = scratch_root("empty");
        let storage = FileStorage::new(&root).unwrap();

        let upload = Upload {
            file_name: "empty.bin".to_string(),
            bytes: Vec::new(),
        };
        assert!(matches!(
            storage.store(&upload).await,
            Err(StorageError::EmptyUpload)
        ));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let root = scratch_root("missing");
        let storage = FileStorage::new(&root).unwrap();

        assert!(matches!(
            storage.read("123_gone.pdf").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            storage.resolve_path("123_gone.pdf"),
            Err(StorageError::NotFound(_))
        ));

        let _ = std::fs::remove_dir_all(&root);
    }
}
