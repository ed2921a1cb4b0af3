use std::cmp::Ordering;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::access;
use crate::document::id::DocumentRef;
use crate::document::model::{DocumentKind, DocumentRecord, NewDocumentRecord, Status, Visibility};
use crate::error::StoreError;
use crate::mutation::RecordPatch;

/// Query-time filter for listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub kind: Option<DocumentKind>,
    pub creator_id: Option<Uuid>,
    pub status: Option<Status>,
    pub visibility: Option<Visibility>,
    /// Only published, public documents (browse views).
    pub listed_only: bool,
    /// Leave out `deleted` documents.
    pub exclude_deleted: bool,
}

impl ListFilter {
    /// Public browse listing.
    pub fn browse(kind: Option<DocumentKind>) -> Self {
        Self {
            kind,
            listed_only: true,
            exclude_deleted: true,
            ..Self::default()
        }
    }

    /// An owner's own documents in any state but deleted.
    pub fn owned_by(creator_id: Uuid, kind: Option<DocumentKind>) -> Self {
        Self {
            kind,
            creator_id: Some(creator_id),
            exclude_deleted: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &DocumentRecord) -> bool {
        if self.kind.is_some_and(|k| k != record.kind) {
            return false;
        }
        if self.creator_id.is_some_and(|c| c != record.creator_id) {
            return false;
        }
        if self.status.is_some_and(|s| s != record.status) {
            return false;
        }
        if self.visibility.is_some_and(|v| v != record.visibility) {
            return false;
        }
        if self.listed_only && !access::is_listed(record) {
            return false;
        }
        if self.exclude_deleted && record.status == Status::Deleted {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    #[default]
    LastUpdatedDesc,
    CreatedDesc,
    TitleAsc,
    MostViewed,
}

impl OrderBy {
    pub fn compare(&self, a: &DocumentRecord, b: &DocumentRecord) -> Ordering {
        match self {
            OrderBy::LastUpdatedDesc => b.last_updated.cmp(&a.last_updated),
            OrderBy::CreatedDesc => b.created_at.cmp(&a.created_at),
            OrderBy::TitleAsc => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            OrderBy::MostViewed => b.view_count.cmp(&a.view_count),
        }
    }

    /// SQL `ORDER BY` clause for this ordering.
    pub fn sql(&self) -> &'static str {
        match self {
            OrderBy::LastUpdatedDesc => "last_updated DESC",
            OrderBy::CreatedDesc => "created_at DESC",
            OrderBy::TitleAsc => "lower(title) ASC",
            OrderBy::MostViewed => "view_count DESC",
        }
    }
}

/// Hosted document database. `content` is an opaque string to the store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, reference: &DocumentRef) -> Result<Option<DocumentRecord>, StoreError>;

    async fn list(
        &self,
        filter: &ListFilter,
        order: OrderBy,
    ) -> Result<Vec<DocumentRecord>, StoreError>;

    /// Insert and return the stored record with its assigned id and slug.
    async fn insert(&self, record: NewDocumentRecord) -> Result<DocumentRecord, StoreError>;

    /// Fails with [`StoreError::NotFound`] if no record has this id.
    async fn update(&self, id: Uuid, patch: &RecordPatch) -> Result<DocumentRecord, StoreError>;

    /// Server-side `+1`; returns the new count.
    async fn increment_views(&self, id: Uuid) -> Result<i64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
