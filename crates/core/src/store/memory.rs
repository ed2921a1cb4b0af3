//! In-process adapters. Used by tests and by hosts running without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::document::id::{slug_for, DocumentRef};
use crate::document::model::{Document, DocumentRecord, NewDocumentRecord};
use crate::error::StoreError;
use crate::mutation::RecordPatch;
use crate::ports::{DocumentStore, DraftStore, ListFilter, ObjectStorage, OrderBy, StoredObject};

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    records: RwLock<HashMap<Uuid, DocumentRecord>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, reference: &DocumentRef) -> Result<Option<DocumentRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(match reference {
            DocumentRef::Id(id) => records.get(id).cloned(),
            DocumentRef::Slug(slug) => records.values().find(|r| &r.slug == slug).cloned(),
        })
    }

    async fn list(
        &self,
        filter: &ListFilter,
        order: OrderBy,
    ) -> Result<Vec<DocumentRecord>, StoreError> {
        let records = self.records.read().await;
        let mut rows: Vec<DocumentRecord> = records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| order.compare(a, b).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn insert(&self, record: NewDocumentRecord) -> Result<DocumentRecord, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let stored = DocumentRecord {
            id,
            kind: record.kind,
            slug: slug_for(&record.title, id),
            title: record.title,
            authors: record.authors,
            content: record.content,
            last_updated: record.last_updated,
            creator_id: record.creator_id,
            status: record.status,
            visibility: record.visibility,
            image_url: record.image_url,
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.records.write().await.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: Uuid, patch: &RecordPatch) -> Result<DocumentRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply_to(record, Utc::now());
        Ok(record.clone())
    }

    async fn increment_views(&self, id: Uuid) -> Result<i64, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.view_count += 1;
        Ok(record.view_count)
    }
}

#[derive(Debug, Clone)]
struct StoredBytes {
    bytes: Vec<u8>,
    content_type: String,
}

#[derive(Debug)]
pub struct MemoryObjectStorage {
    base_url: String,
    objects: RwLock<HashMap<String, StoredBytes>>,
}

impl MemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Stored bytes and content type for a path.
    pub async fn object(&self, path: &str) -> Option<(Vec<u8>, String)> {
        self.objects
            .read()
            .await
            .get(path)
            .map(|o| (o.bytes.clone(), o.content_type.clone()))
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StoreError> {
        self.objects.write().await.insert(
            path.to_string(),
            StoredBytes {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(StoredObject {
            path: path.to_string(),
        })
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    drafts: RwLock<HashMap<String, Document>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn save_draft(&self, key: &str, document: &Document) -> Result<(), StoreError> {
        self.drafts
            .write()
            .await
            .insert(key.to_string(), document.clone());
        Ok(())
    }

    async fn load_draft(&self, key: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.drafts.read().await.get(key).cloned())
    }

    async fn discard_draft(&self, key: &str) -> Result<(), StoreError> {
        self.drafts.write().await.remove(key);
        Ok(())
    }
}
