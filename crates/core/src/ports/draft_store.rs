use async_trait::async_trait;

use crate::document::model::Document;
use crate::error::StoreError;

/// On-device copy of an in-progress document, written when a save fails.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn save_draft(&self, key: &str, document: &Document) -> Result<(), StoreError>;

    async fn load_draft(&self, key: &str) -> Result<Option<Document>, StoreError>;

    async fn discard_draft(&self, key: &str) -> Result<(), StoreError>;
}
