use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tokio::fs;

use crate::errors::ServiceError;

/// Disk-backed object store for uploaded media.
///
/// Objects are written below a root directory under caller-chosen relative
/// keys and exposed by the HTTP layer under a public base path. Old objects
/// are never cleaned up; uploads only accumulate.
#[derive(Clone)]
pub struct MediaStore {
    root: PathBuf,
    public_base: String,
}

impl MediaStore {
    /// Initialize the store, creating the root directory if missing.
    pub async fn new(
        root: impl Into<PathBuf>,
        public_base: impl Into<String>,
    ) -> Result<Arc<Self>, ServiceError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| ServiceError::Db(format!("cannot create media root: {e}")))?;
        let public_base = public_base.into().trim_end_matches('/').to_string();
        Ok(Arc::new(Self { root, public_base }))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL prefix the HTTP layer mounts the root under.
    pub fn public_base(&self) -> &str {
        &self.public_base
    }

    /// Write an object under `key` and return its public URL.
    ///
    /// Keys must be relative paths without parent components.
    pub async fn put(&self, key: &str, bytes: &[u8]) -> Result<String, ServiceError> {
        validate_key(key)?;
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::Db(format!("cannot create object dir: {e}")))?;
        }
        fs::write(&path, bytes)
            .await
            .map_err(|e| ServiceError::Db(format!("cannot write object: {e}")))?;
        Ok(format!("{}/{}", self.public_base, key))
    }
}

fn validate_key(key: &str) -> Result<(), ServiceError> {
    if key.is_empty() {
        return Err(ServiceError::Validation("object key must not be empty".into()));
    }
    let path = Path::new(key);
    let safe = path
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !safe {
        return Err(ServiceError::Validation("object key must be a plain relative path".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("media_store_{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn put_writes_bytes_and_returns_public_url() -> Result<(), anyhow::Error> {
        let root = temp_root();
        let store = MediaStore::new(&root, "/uploads").await?;

        let url = store.put("user-7/1700000000000.png", b"png-bytes").await?;
        assert_eq!(url, "/uploads/user-7/1700000000000.png");

        let on_disk = tokio::fs::read(root.join("user-7/1700000000000.png")).await?;
        assert_eq!(on_disk, b"png-bytes");

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn overwriting_a_key_replaces_the_object() -> Result<(), anyhow::Error> {
        let root = temp_root();
        let store = MediaStore::new(&root, "/uploads/").await?;

        store.put("a.jpg", b"one").await?;
        store.put("a.jpg", b"two").await?;
        let on_disk = tokio::fs::read(root.join("a.jpg")).await?;
        assert_eq!(on_disk, b"two");

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn rejects_traversal_keys() -> Result<(), anyhow::Error> {
        let root = temp_root();
        let store = MediaStore::new(&root, "/uploads").await?;

        assert!(store.put("", b"x").await.is_err());
        assert!(store.put("../escape.jpg", b"x").await.is_err());
        assert!(store.put("/absolute.jpg", b"x").await.is_err());

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
