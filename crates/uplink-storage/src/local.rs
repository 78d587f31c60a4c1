use crate::keys;
use crate::traits::{
    ObjectMetadata, ObjectStream, Storage, StorageBackend, StorageError, StorageResult,
    StoredObject,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Objects live under `base_path`, one file per key plus a sidecar metadata
/// file. Writes go to a `.part` temp file first and are renamed into place,
/// so a failed store never leaves a partially-visible object.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "./data/objects")
    /// * `public_base_url` - Base URL public references are derived from
    ///   (e.g., "http://localhost:5000"); objects are served under `/objects/{key}`
    pub async fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: String,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            public_base_url,
        })
    }

    /// Convert an object key to a filesystem path with security validation.
    ///
    /// Rejects keys that could escape the base storage directory.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty()
            || key.contains("..")
            || key.starts_with('/')
            || key.contains('\\')
            || key.contains('\0')
        {
            return Err(StorageError::InvalidKey(
                "Object key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(key))
    }

    /// Generate the stable public URL for an object key.
    fn generate_url(&self, key: &str) -> String {
        format!(
            "{}/objects/{}",
            self.public_base_url.trim_end_matches('/'),
            key
        )
    }

    /// Write `data` to `path` atomically: write and sync a `.part` sibling,
    /// then rename it into place.
    async fn write_atomic(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let part_path = path.with_extension(match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.part", ext),
            None => "part".to_string(),
        });

        let result: std::io::Result<()> = async {
            let mut file = fs::File::create(&part_path).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&part_path, path).await
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&part_path).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to write file {}: {}",
                path.display(),
                e
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn store(
        &self,
        original_filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredObject> {
        let key = keys::generate_object_key(original_filename);
        let path = self.key_to_path(&key)?;
        let meta_path = self.key_to_path(&keys::metadata_key(&key))?;
        let size = data.len() as u64;

        let start = std::time::Instant::now();

        let metadata = ObjectMetadata {
            original_filename: original_filename.to_string(),
            content_type: content_type.to_string(),
            size,
        };
        let meta_bytes = serde_json::to_vec(&metadata).map_err(|e| {
            StorageError::UploadFailed(format!("Failed to encode object metadata: {}", e))
        })?;

        // Metadata first: the object only becomes visible once the data file
        // lands, and resolve requires both.
        self.write_atomic(&meta_path, &meta_bytes).await?;
        if let Err(e) = self.write_atomic(&path, &data).await {
            let _ = fs::remove_file(&meta_path).await;
            return Err(e);
        }

        let public_url = self.generate_url(&key);

        tracing::info!(
            key = %key,
            original_filename = %original_filename,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage store successful"
        );

        Ok(StoredObject {
            key,
            public_url,
            content_type: metadata.content_type,
            original_filename: metadata.original_filename,
            size,
        })
    }

    async fn resolve(&self, key: &str) -> StorageResult<(ObjectMetadata, ObjectStream)> {
        if keys::is_metadata_key(key) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let path = self.key_to_path(key)?;
        let meta_path = self.key_to_path(&keys::metadata_key(key))?;
        let start = std::time::Instant::now();

        let meta_bytes = match fs::read(&meta_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed(format!(
                    "Failed to read object metadata {}: {}",
                    meta_path.display(),
                    e
                )));
            }
        };
        let metadata: ObjectMetadata = serde_json::from_slice(&meta_bytes).map_err(|e| {
            StorageError::BackendError(format!(
                "Corrupt object metadata {}: {}",
                meta_path.display(),
                e
            ))
        })?;

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed(format!(
                    "Failed to open file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let reader = tokio_util::io::ReaderStream::new(file);
        let stream = reader.map(|result| {
            result.map_err(|e| StorageError::DownloadFailed(format!("Failed to read chunk: {}", e)))
        });

        let logged_key = key.to_string();
        let logged_stream = stream.map(move |item| {
            if item.is_err() {
                tracing::error!(
                    key = %logged_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage stream read error"
                );
            }
            item
        });

        tracing::debug!(
            key = %key,
            content_type = %metadata.content_type,
            size_bytes = metadata.size,
            "Local storage resolve successful"
        );

        Ok((metadata, Box::pin(logged_stream)))
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        if keys::is_metadata_key(key) {
            return Ok(false);
        }
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tempfile::tempdir;

    const BASE_URL: &str = "http://localhost:5000";

    async fn test_storage(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(dir.path(), BASE_URL.to_string())
            .await
            .unwrap()
    }

    async fn collect(mut stream: ObjectStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_store_resolve_round_trip() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        let data = Bytes::from_static(b"test image bytes");
        let stored = storage
            .store("holiday.png", "image/png", data.clone())
            .await
            .unwrap();

        assert!(stored.public_url.starts_with("http://localhost:5000/objects/"));
        assert!(stored.public_url.ends_with(".png"));
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(stored.size, data.len() as u64);

        let (metadata, stream) = storage.resolve(&stored.key).await.unwrap();
        assert_eq!(metadata.content_type, "image/png");
        assert_eq!(metadata.original_filename, "holiday.png");
        assert_eq!(collect(stream).await, data.to_vec());
    }

    #[tokio::test]
    async fn test_resolve_unknown_key_not_found() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        let result = storage.resolve("00000000-0000-0000-0000-000000000000.png").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        let result = storage.resolve("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_concurrent_stores_with_same_filename_never_collide() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        let (a, b) = tokio::join!(
            storage.store("same.png", "image/png", Bytes::from_static(b"first")),
            storage.store("same.png", "image/png", Bytes::from_static(b"second")),
        );
        let a = a.unwrap();
        let b = b.unwrap();

        assert_ne!(a.key, b.key);

        let (_, stream_a) = storage.resolve(&a.key).await.unwrap();
        let (_, stream_b) = storage.resolve(&b.key).await.unwrap();
        assert_eq!(collect(stream_a).await, b"first");
        assert_eq!(collect(stream_b).await, b"second");
    }

    #[tokio::test]
    async fn test_metadata_sidecar_not_servable() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        let stored = storage
            .store("a.png", "image/png", Bytes::from_static(b"bytes"))
            .await
            .unwrap();

        let meta_key = format!("{}.meta", stored.key);
        let result = storage.resolve(&meta_key).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        assert!(!storage.exists(&meta_key).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        let stored = storage
            .store("a.gif", "image/gif", Bytes::from_static(b"gif"))
            .await
            .unwrap();

        assert!(storage.exists(&stored.key).await.unwrap());
        assert!(!storage.exists("missing.gif").await.unwrap());
    }

    #[tokio::test]
    async fn test_no_part_files_left_behind() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        storage
            .store("a.mp4", "video/mp4", Bytes::from_static(b"video"))
            .await
            .unwrap();

        let mut entries = fs::read_dir(dir.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let name = entry.file_name().to_string_lossy().to_string();
            assert!(!name.ends_with(".part"), "leftover temp file: {}", name);
        }
    }
}
