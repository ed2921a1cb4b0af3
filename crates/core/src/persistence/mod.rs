//! Persistence adapter: the only place a [`Document`] meets the document store.
//!
//! Sections travel as one JSON blob in `content`; every other field is its
//! own column. Saves are last-write-wins: an update rewrites the whole blob.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::access;
use crate::auth::{User, Viewer};
use crate::codec;
use crate::document::id::DocumentRef;
use crate::document::model::{Document, DocumentRecord, DocumentSummary, NewDocumentRecord, Status};
use crate::document::validate::validate_document;
use crate::error::{DocError, StoreError};
use crate::events::types::SavedEvent;
use crate::events::{DocumentEvent, EventBus};
use crate::mutation::RecordPatch;
use crate::ports::{DocumentStore, ListFilter, OrderBy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Updated,
}

/// Rebuild a document from its stored record.
pub fn document_from_record(record: DocumentRecord) -> Document {
    let sections = codec::deserialize_sections(record.kind, &record.content);
    Document {
        id: Some(record.id),
        kind: record.kind,
        slug: Some(record.slug),
        title: record.title,
        authors: record.authors,
        sections,
        status: record.status,
        visibility: record.visibility,
        creator_id: Some(record.creator_id),
        image_url: record.image_url,
        last_updated: Some(record.last_updated),
        created_at: Some(record.created_at),
        updated_at: Some(record.updated_at),
        view_count: record.view_count,
    }
}

pub fn summary_from_record(record: DocumentRecord) -> DocumentSummary {
    let section_count = codec::deserialize_sections(record.kind, &record.content).len();
    DocumentSummary {
        id: record.id,
        kind: record.kind,
        slug: record.slug,
        title: record.title,
        authors: record.authors,
        status: record.status,
        visibility: record.visibility,
        image_url: record.image_url,
        last_updated: record.last_updated,
        view_count: record.view_count,
        section_count,
    }
}

#[derive(Clone)]
pub struct DocumentRepository {
    store: Arc<dyn DocumentStore>,
    events: Option<EventBus>,
}

impl DocumentRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            events: None,
        }
    }

    /// Emit `Saved` / `Deleted` events on this bus.
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    async fn fetch(&self, reference: &DocumentRef) -> Result<DocumentRecord, DocError> {
        self.store
            .get(reference)
            .await?
            .ok_or_else(|| DocError::NotFound(reference.to_string()))
    }

    /// Load for reading. Deleted documents only resolve for their owner.
    #[tracing::instrument(skip(self, viewer))]
    pub async fn load(&self, reference: &DocumentRef, viewer: &Viewer) -> Result<Document, DocError> {
        let record = self.fetch(reference).await?;
        let owner = access::is_owner(&record, viewer);
        if record.status == Status::Deleted && !owner {
            return Err(DocError::NotFound(reference.to_string()));
        }
        if !access::can_view(&record, viewer) {
            tracing::debug!(document_id = %record.id, "view denied");
            return Err(DocError::Forbidden);
        }
        Ok(document_from_record(record))
    }

    /// Load for editing: owner only.
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn load_for_edit(&self, reference: &DocumentRef, user: &User) -> Result<Document, DocError> {
        let record = self.fetch(reference).await?;
        if !access::can_edit(&record, &Viewer::User(user.clone())) {
            return Err(DocError::Forbidden);
        }
        Ok(document_from_record(record))
    }

    /// Validate, then insert or update.
    ///
    /// A document without an id is inserted and adopts the stored identity.
    /// Otherwise the stored record must belong to `actor` before anything is
    /// written. `last_updated` is set to now on every save.
    #[tracing::instrument(skip(self, doc, actor), fields(document_id = ?doc.id, user_id = %actor.id))]
    pub async fn save(&self, doc: &mut Document, actor: &User) -> Result<SaveOutcome, DocError> {
        validate_document(doc)?;
        let content = codec::serialize_sections(doc.kind, &doc.sections).map_err(StoreError::from)?;
        let now = Utc::now();

        let (record, outcome) = match doc.id {
            None => {
                let record = self
                    .store
                    .insert(NewDocumentRecord {
                        kind: doc.kind,
                        title: doc.title.clone(),
                        authors: doc.authors.clone(),
                        content,
                        last_updated: now,
                        creator_id: actor.id,
                        status: doc.status,
                        visibility: doc.visibility,
                        image_url: doc.image_url.clone(),
                    })
                    .await?;
                (record, SaveOutcome::Created)
            }
            Some(id) => {
                let existing = self.fetch(&DocumentRef::Id(id)).await?;
                if existing.creator_id != actor.id {
                    tracing::warn!(document_id = %id, "update by non-owner rejected");
                    return Err(DocError::Forbidden);
                }
                let patch = RecordPatch {
                    title: Some(doc.title.clone()),
                    authors: Some(doc.authors.clone()),
                    content: Some(content),
                    last_updated: Some(now),
                    status: Some(doc.status),
                    visibility: Some(doc.visibility),
                    image_url: Some(doc.image_url.clone()),
                };
                let record = self.store.update(id, &patch).await?;
                (record, SaveOutcome::Updated)
            }
        };

        doc.id = Some(record.id);
        doc.slug = Some(record.slug.clone());
        doc.creator_id = Some(record.creator_id);
        doc.last_updated = Some(record.last_updated);
        doc.created_at = Some(record.created_at);
        doc.updated_at = Some(record.updated_at);
        doc.view_count = record.view_count;

        tracing::info!(document_id = %record.id, ?outcome, "document saved");
        if let Some(bus) = &self.events {
            bus.emit(DocumentEvent::Saved(SavedEvent {
                document_id: record.id,
                kind: record.kind,
                status: record.status,
                created: outcome == SaveOutcome::Created,
                section_count: doc.sections.len(),
                timestamp: now,
            }));
        }
        Ok(outcome)
    }

    /// Logical delete: the owner's document moves to `deleted`.
    #[tracing::instrument(skip(self, actor), fields(user_id = %actor.id))]
    pub async fn delete(&self, id: Uuid, actor: &User) -> Result<(), DocError> {
        let existing = self.fetch(&DocumentRef::Id(id)).await?;
        if existing.creator_id != actor.id {
            return Err(DocError::Forbidden);
        }
        self.store
            .update(id, &RecordPatch::status(Status::Deleted))
            .await?;
        if let Some(bus) = &self.events {
            bus.emit(DocumentEvent::Deleted { document_id: id });
        }
        Ok(())
    }

    pub async fn list(&self, filter: &ListFilter, order: OrderBy) -> Result<Vec<DocumentSummary>, DocError> {
        let records = self.store.list(filter, order).await?;
        Ok(records.into_iter().map(summary_from_record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::{DocumentKind, Visibility};
    use crate::document::section::Content;
    use crate::document::validate::ValidationError;
    use crate::error::ErrorCategory;
    use crate::store::MemoryDocumentStore;

    fn user() -> User {
        User::new(Uuid::new_v4(), Some("ada@example.com".into()))
    }

    fn repo() -> (Arc<MemoryDocumentStore>, DocumentRepository) {
        let store = Arc::new(MemoryDocumentStore::new());
        let repo = DocumentRepository::new(store.clone());
        (store, repo)
    }

    fn codelab() -> Document {
        let mut doc = Document::new(DocumentKind::Codelab, "Rust 101", vec!["Ada".into()]);
        doc.add_section("Overview");
        doc.add_section("Setup");
        doc
    }

    #[tokio::test]
    async fn create_adopts_store_identity() {
        let (_, repo) = repo();
        let owner = user();
        let mut doc = codelab();

        assert_eq!(repo.save(&mut doc, &owner).await.unwrap(), SaveOutcome::Created);
        let id = doc.id.unwrap();
        assert_eq!(doc.creator_id, Some(owner.id));
        assert!(doc.slug.as_deref().unwrap().starts_with("rust-101-"));
        assert!(doc.last_updated.is_some());

        let loaded = repo.load(&id.into(), &Viewer::User(owner)).await.unwrap();
        assert_eq!(loaded.sections, doc.sections);
        assert_eq!(loaded.title, "Rust 101");
    }

    #[tokio::test]
    async fn load_by_slug() {
        let (_, repo) = repo();
        let owner = user();
        let mut doc = codelab();
        repo.save(&mut doc, &owner).await.unwrap();

        let slug = DocumentRef::parse(doc.slug.as_deref().unwrap());
        let loaded = repo.load(&slug, &Viewer::Anonymous).await.unwrap();
        assert_eq!(loaded.id, doc.id);
    }

    #[tokio::test]
    async fn update_rewrites_blob_and_timestamp() {
        let (store, repo) = repo();
        let owner = user();
        let mut doc = codelab();
        repo.save(&mut doc, &owner).await.unwrap();
        let first_saved = doc.last_updated.unwrap();

        let setup = doc.sections[1].id.clone();
        doc.set_section_content(&setup, Content::Html("<p>cargo new</p>".into()))
            .unwrap();
        assert_eq!(repo.save(&mut doc, &owner).await.unwrap(), SaveOutcome::Updated);
        assert!(doc.last_updated.unwrap() >= first_saved);

        let record = store.get(&doc.id.unwrap().into()).await.unwrap().unwrap();
        assert!(record.content.contains("cargo new"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn non_owner_cannot_update() {
        let (store, repo) = repo();
        let owner = user();
        let mut doc = codelab();
        repo.save(&mut doc, &owner).await.unwrap();

        let mut stolen = doc.clone();
        stolen.title = "Mine now".into();
        let err = repo.save(&mut stolen, &user()).await.unwrap_err();
        assert!(matches!(err, DocError::Forbidden));
        assert_eq!(err.category(), ErrorCategory::NotFound);

        let record = store.get(&doc.id.unwrap().into()).await.unwrap().unwrap();
        assert_eq!(record.title, "Rust 101");
    }

    #[tokio::test]
    async fn validation_blocks_before_any_write() {
        let (store, repo) = repo();
        let mut doc = codelab();
        doc.title = String::new();
        doc.authors = vec![String::new()];

        let err = repo.save(&mut doc, &user()).await.unwrap_err();
        assert!(matches!(err, DocError::Validation(ValidationError::EmptyTitle)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn private_documents_hidden_from_others() {
        let (_, repo) = repo();
        let owner = user();
        let mut doc = codelab();
        doc.set_visibility(Visibility::Private);
        repo.save(&mut doc, &owner).await.unwrap();
        let id: DocumentRef = doc.id.unwrap().into();

        assert!(matches!(
            repo.load(&id, &Viewer::Anonymous).await.unwrap_err(),
            DocError::Forbidden
        ));
        assert!(matches!(
            repo.load_for_edit(&id, &user()).await.unwrap_err(),
            DocError::Forbidden
        ));
        assert!(repo.load(&id, &Viewer::User(owner.clone())).await.is_ok());
        assert!(repo.load_for_edit(&id, &owner).await.is_ok());
    }

    #[tokio::test]
    async fn corrupt_blob_still_loads() {
        let (store, repo) = repo();
        let owner = user();
        let mut doc = codelab();
        repo.save(&mut doc, &owner).await.unwrap();
        let id = doc.id.unwrap();

        store
            .update(
                id,
                &RecordPatch {
                    content: Some("{\"sections\": [oops".into()),
                    ..RecordPatch::default()
                },
            )
            .await
            .unwrap();

        let loaded = repo.load(&id.into(), &Viewer::Anonymous).await.unwrap();
        assert_eq!(loaded.sections.len(), 1);
        assert_eq!(loaded.sections[0].title, codec::FALLBACK_TITLE);
    }

    #[tokio::test]
    async fn delete_is_logical_and_hides_document() {
        let (store, repo) = repo();
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let repo = repo.with_events(bus);
        let owner = user();
        let mut doc = codelab();
        doc.set_status(Status::Published);
        repo.save(&mut doc, &owner).await.unwrap();
        let id = doc.id.unwrap();
        assert!(matches!(rx.recv().await.unwrap(), DocumentEvent::Saved(e) if e.created));

        assert!(matches!(
            repo.delete(id, &user()).await.unwrap_err(),
            DocError::Forbidden
        ));
        repo.delete(id, &owner).await.unwrap();
        assert!(matches!(rx.recv().await.unwrap(), DocumentEvent::Deleted { document_id } if document_id == id));

        let record = store.get(&id.into()).await.unwrap().unwrap();
        assert_eq!(record.status, Status::Deleted);
        assert!(matches!(
            repo.load(&id.into(), &Viewer::Anonymous).await.unwrap_err(),
            DocError::NotFound(_)
        ));
        assert!(repo.load(&id.into(), &Viewer::User(owner.clone())).await.is_ok());
        assert!(repo
            .list(&ListFilter::owned_by(owner.id, None), OrderBy::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn list_reports_section_counts() {
        let (_, repo) = repo();
        let owner = user();
        let mut doc = codelab();
        doc.set_status(Status::Published);
        repo.save(&mut doc, &owner).await.unwrap();

        let listed = repo
            .list(&ListFilter::browse(Some(DocumentKind::Codelab)), OrderBy::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].section_count, 2);
        assert!(repo
            .list(&ListFilter::browse(Some(DocumentKind::Blog)), OrderBy::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn update_of_vanished_document_is_not_found() {
        let (_, repo) = repo();
        let mut doc = codelab();
        doc.id = Some(Uuid::new_v4());
        assert!(matches!(
            repo.save(&mut doc, &user()).await.unwrap_err(),
            DocError::NotFound(_)
        ));
    }
}
