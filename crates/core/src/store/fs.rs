//! Filesystem adapters: object storage served from a directory, and the
//! on-device draft store.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::document::model::Document;
use crate::error::StoreError;
use crate::ports::{DraftStore, ObjectStorage, StoredObject};

/// Reject absolute paths and `..` so uploads stay under the root.
fn confined(root: &Path, relative: &str) -> Result<PathBuf, StoreError> {
    let rel = Path::new(relative);
    if rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(StoreError::Permission(format!("invalid object path: {relative}")));
    }
    Ok(root.join(rel))
}

#[derive(Debug, Clone)]
pub struct FsObjectStorage {
    root: PathBuf,
    base_url: String,
}

impl FsObjectStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ObjectStorage for FsObjectStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StoreError> {
        let target = confined(&self.root, path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, &bytes).await?;
        tracing::debug!(path, content_type, size = bytes.len(), "stored object");
        Ok(StoredObject {
            path: path.to_string(),
        })
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// One JSON file per draft key.
#[derive(Debug, Clone)]
pub struct FsDraftStore {
    dir: PathBuf,
}

impl FsDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        confined(&self.dir, &format!("{key}.json"))
    }
}

#[async_trait]
impl DraftStore for FsDraftStore {
    async fn save_draft(&self, key: &str, document: &Document) -> Result<(), StoreError> {
        let file = self.file_for(key)?;
        fs::create_dir_all(&self.dir).await?;
        let body = serde_json::to_vec_pretty(document)?;
        fs::write(file, body).await?;
        Ok(())
    }

    async fn load_draft(&self, key: &str) -> Result<Option<Document>, StoreError> {
        let file = self.file_for(key)?;
        match fs::read(&file).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn discard_draft(&self, key: &str) -> Result<(), StoreError> {
        let file = self.file_for(key)?;
        match fs::remove_file(&file).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
