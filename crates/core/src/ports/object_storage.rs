use async_trait::async_trait;
use serde::Serialize;

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub path: String,
}

/// Hosted object storage for avatars, cover images and inline images.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StoreError>;

    /// Publicly reachable URL. Treated as an opaque string by callers.
    fn public_url(&self, path: &str) -> String;
}
