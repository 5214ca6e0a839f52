use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Fallback extension for uploads whose filename carries none.
const DEFAULT_EXTENSION: &str = "bin";

/// Local-disk blob store for avatar images.
///
/// Storage keys are generated server-side as `{uuid_v4}.{ext}` so
/// client-supplied names never reach the filesystem. [`resolve`] and
/// [`delete`] still re-check the key shape, which keeps path traversal out
/// even for keys read back from the database.
///
/// [`resolve`]: FileStorageService::resolve
/// [`delete`]: FileStorageService::delete
#[derive(Clone)]
pub struct FileStorageService {
    upload_dir: PathBuf,
    max_upload_size: u64,
}

impl FileStorageService {
    pub fn new(upload_dir: impl Into<PathBuf>, max_upload_size: u64) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_upload_size,
        }
    }

    /// Maximum accepted blob size in bytes.
    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    /// Creates the upload directory if missing. Called once at startup so
    /// [`store`](FileStorageService::store) can assume it exists.
    pub async fn ensure_upload_dir(&self) -> AppResult<()> {
        fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| AppError::Io {
                operation: format!("create upload directory {}", self.upload_dir.display()),
                source: e,
            })
    }

    /// Persists a blob under a fresh UUID key, preserving the extension of
    /// the original filename, and returns the key.
    pub async fn store(&self, bytes: &[u8], original_filename: &str) -> AppResult<String> {
        if bytes.len() as u64 > self.max_upload_size {
            return Err(AppError::Validation {
                field: "file".to_string(),
                reason: format!(
                    "File size {} exceeds the maximum of {} bytes",
                    bytes.len(),
                    self.max_upload_size
                ),
            });
        }

        let key = format!("{}.{}", Uuid::new_v4(), extension_of(original_filename));
        let path = self.upload_dir.join(&key);
        fs::write(&path, bytes).await.map_err(|e| AppError::Io {
            operation: format!("store blob {key}"),
            source: e,
        })?;

        Ok(key)
    }

    /// Returns the on-disk path of a stored blob, or
    /// [`AppError::NotFound`] when no blob exists under the key.
    pub async fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let path = self.safe_path(key)?;
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(file_not_found(key)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(file_not_found(key)),
            Err(e) => Err(AppError::Io {
                operation: format!("stat blob {key}"),
                source: e,
            }),
        }
    }

    /// Removes a stored blob. Deleting a key with no blob behind it is an
    /// error, not a no-op; callers decide whether the failure matters.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.safe_path(key)?;
        fs::remove_file(&path).await.map_err(|e| AppError::Io {
            operation: format!("delete blob {key}"),
            source: e,
        })
    }

    /// Joins the key onto the upload directory after rejecting anything
    /// that could escape it.
    fn safe_path(&self, key: &str) -> AppResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(AppError::BadRequest {
                message: format!("Invalid storage key '{key}'"),
            });
        }
        Ok(self.upload_dir.join(key))
    }
}

/// Extracts a normalized extension from the client filename, falling back
/// to [`DEFAULT_EXTENSION`] when there is none usable.
fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

fn file_not_found(key: &str) -> AppError {
    AppError::NotFound {
        entity: "file".to_string(),
        field: "key".to_string(),
        value: key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MAX_SIZE: u64 = 1024;

    fn service(dir: &Path) -> FileStorageService {
        FileStorageService::new(dir, MAX_SIZE)
    }

    #[test]
    fn test_extension_of_preserves_and_lowercases() {
        assert_eq!(extension_of("avatar.png"), "png");
        assert_eq!(extension_of("PHOTO.JPG"), "jpg");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
    }

    #[test]
    fn test_extension_of_falls_back_to_default() {
        assert_eq!(extension_of("noextension"), DEFAULT_EXTENSION);
        assert_eq!(extension_of(""), DEFAULT_EXTENSION);
        assert_eq!(extension_of("trailing."), DEFAULT_EXTENSION);
        assert_eq!(extension_of("weird.p%g"), DEFAULT_EXTENSION);
    }

    #[tokio::test]
    async fn test_store_writes_blob_under_uuid_key() {
        let dir = tempdir().unwrap();
        let storage = service(dir.path());

        let key = storage.store(b"fake image bytes", "avatar.png").await.unwrap();

        assert!(key.ends_with(".png"));
        let stem = key.strip_suffix(".png").unwrap();
        assert!(Uuid::parse_str(stem).is_ok(), "key stem is not a UUID: {stem}");

        let written = std::fs::read(dir.path().join(&key)).unwrap();
        assert_eq!(written, b"fake image bytes");
    }

    #[tokio::test]
    async fn test_store_defaults_extension() {
        let dir = tempdir().unwrap();
        let storage = service(dir.path());

        let key = storage.store(b"bytes", "noextension").await.unwrap();
        assert!(key.ends_with(".bin"));
    }

    #[tokio::test]
    async fn test_store_rejects_oversized_payload() {
        let dir = tempdir().unwrap();
        let storage = service(dir.path());

        let oversized = vec![0u8; (MAX_SIZE + 1) as usize];
        let result = storage.store(&oversized, "big.png").await;

        assert!(matches!(
            result,
            Err(AppError::Validation { ref field, .. }) if field == "file"
        ));
        // Nothing may be left behind on rejection.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_resolve_returns_path_of_stored_blob() {
        let dir = tempdir().unwrap();
        let storage = service(dir.path());

        let key = storage.store(b"bytes", "a.png").await.unwrap();
        let path = storage.resolve(&key).await.unwrap();

        assert_eq!(path, dir.path().join(&key));
    }

    #[tokio::test]
    async fn test_resolve_missing_key_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = service(dir.path());

        let result = storage.resolve("0f8fad5b-d9cb-469f-a165-70867728950e.png").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_resolve_rejects_traversal_keys() {
        let dir = tempdir().unwrap();
        let storage = service(dir.path());

        for key in ["../secret.txt", "a/../../b.png", "sub/dir.png", "back\\slash.png", ""] {
            let result = storage.resolve(key).await;
            assert!(
                matches!(result, Err(AppError::BadRequest { .. })),
                "key {key:?} was not rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_delete_removes_blob() {
        let dir = tempdir().unwrap();
        let storage = service(dir.path());

        let key = storage.store(b"bytes", "a.png").await.unwrap();
        storage.delete(&key).await.unwrap();

        assert!(!dir.path().join(&key).exists());
    }

    #[tokio::test]
    async fn test_delete_missing_blob_is_an_error() {
        let dir = tempdir().unwrap();
        let storage = service(dir.path());

        let result = storage.delete("0f8fad5b-d9cb-469f-a165-70867728950e.png").await;
        assert!(matches!(result, Err(AppError::Io { .. })));
    }

    #[tokio::test]
    async fn test_ensure_upload_dir_creates_nested_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileStorageService::new(&nested, MAX_SIZE);

        storage.ensure_upload_dir().await.unwrap();
        assert!(nested.is_dir());

        // A second call on an existing directory is fine.
        storage.ensure_upload_dir().await.unwrap();
    }
}
