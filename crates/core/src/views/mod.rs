//! View counting, decoupled from the document model.
//!
//! Each page load increments the stored counter at most once, through the
//! store's server-side `+1`. Only published documents are counted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::document::model::{Document, Status};
use crate::error::StoreError;
use crate::events::{DocumentEvent, EventBus};
use crate::ports::{Analytics, DocumentStore};

/// One load of a document by one visitor.
#[derive(Debug, Default)]
pub struct PageLoad {
    counted: AtomicBool,
}

impl PageLoad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_counted(&self) -> bool {
        self.counted.load(Ordering::Acquire)
    }
}

#[derive(Clone)]
pub struct ViewCounter {
    store: Arc<dyn DocumentStore>,
    analytics: Arc<dyn Analytics>,
    events: Option<EventBus>,
}

impl ViewCounter {
    pub fn new(store: Arc<dyn DocumentStore>, analytics: Arc<dyn Analytics>) -> Self {
        Self {
            store,
            analytics,
            events: None,
        }
    }

    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Count this load if it has not been counted yet.
    ///
    /// Returns the new total, or `None` when nothing was incremented.
    pub async fn record(&self, load: &PageLoad, doc: &Document) -> Result<Option<i64>, StoreError> {
        let Some(id) = doc.id else {
            return Ok(None);
        };
        if doc.status != Status::Published {
            return Ok(None);
        }
        if load.counted.swap(true, Ordering::AcqRel) {
            return Ok(None);
        }

        let count = match self.store.increment_views(id).await {
            Ok(count) => count,
            Err(err) => {
                load.counted.store(false, Ordering::Release);
                return Err(err);
            }
        };
        self.announce(id, doc, count);
        Ok(Some(count))
    }

    fn announce(&self, id: Uuid, doc: &Document, count: i64) {
        self.analytics.log_event(
            "document_view",
            json!({ "documentId": id, "kind": doc.kind, "viewCount": count }),
        );
        if let Some(bus) = &self.events {
            bus.emit(DocumentEvent::Viewed {
                document_id: id,
                view_count: count,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::User;
    use crate::events::BusAnalytics;
    use crate::persistence::DocumentRepository;
    use crate::ports::NoopAnalytics;
    use crate::store::MemoryDocumentStore;
    use crate::DocumentKind;

    async fn published(store: Arc<MemoryDocumentStore>) -> Document {
        let repo = DocumentRepository::new(store);
        let mut doc = Document::new(DocumentKind::Blog, "Post", vec!["Ada".into()]);
        doc.add_section("Body");
        doc.set_status(Status::Published);
        repo.save(&mut doc, &User::new(Uuid::new_v4(), None))
            .await
            .unwrap();
        doc
    }

    #[tokio::test]
    async fn one_increment_per_load() {
        let store = Arc::new(MemoryDocumentStore::new());
        let doc = published(store.clone()).await;
        let counter = ViewCounter::new(store.clone(), Arc::new(NoopAnalytics));

        let load = PageLoad::new();
        assert_eq!(counter.record(&load, &doc).await.unwrap(), Some(1));
        assert_eq!(counter.record(&load, &doc).await.unwrap(), None);
        assert!(load.is_counted());

        let second_session = PageLoad::new();
        assert_eq!(counter.record(&second_session, &doc).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn drafts_and_unsaved_documents_are_not_counted() {
        let store = Arc::new(MemoryDocumentStore::new());
        let counter = ViewCounter::new(store.clone(), Arc::new(NoopAnalytics));

        let unsaved = Document::new(DocumentKind::Codelab, "x", vec![]);
        assert_eq!(counter.record(&PageLoad::new(), &unsaved).await.unwrap(), None);

        let mut draft = published(store.clone()).await;
        draft.status = Status::Draft;
        assert_eq!(counter.record(&PageLoad::new(), &draft).await.unwrap(), None);
    }

    #[tokio::test]
    async fn concurrent_loads_all_count() {
        let store = Arc::new(MemoryDocumentStore::new());
        let doc = Arc::new(published(store.clone()).await);
        let counter = ViewCounter::new(store.clone(), Arc::new(NoopAnalytics));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let counter = counter.clone();
                let doc = doc.clone();
                tokio::spawn(async move { counter.record(&PageLoad::new(), &doc).await.unwrap() })
            })
            .collect();
        for h in handles {
            assert!(h.await.unwrap().is_some());
        }

        let stored = store.get(&doc.id.unwrap().into()).await.unwrap().unwrap();
        assert_eq!(stored.view_count, 32);
    }

    #[tokio::test]
    async fn views_are_announced() {
        let store = Arc::new(MemoryDocumentStore::new());
        let doc = published(store.clone()).await;
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let counter = ViewCounter::new(store, Arc::new(BusAnalytics::new(bus.clone())))
            .with_events(bus);

        counter.record(&PageLoad::new(), &doc).await.unwrap();

        assert!(matches!(rx.recv().await.unwrap(), DocumentEvent::Analytics(e) if e.name == "document_view"));
        assert!(matches!(
            rx.recv().await.unwrap(),
            DocumentEvent::Viewed { view_count: 1, .. }
        ));
    }

    #[tokio::test]
    async fn failed_increment_can_be_retried() {
        let store = Arc::new(MemoryDocumentStore::new());
        let counter = ViewCounter::new(store, Arc::new(NoopAnalytics));
        let mut ghost = Document::new(DocumentKind::Blog, "gone", vec![]);
        ghost.id = Some(Uuid::new_v4());
        ghost.status = Status::Published;

        let load = PageLoad::new();
        assert!(counter.record(&load, &ghost).await.is_err());
        assert!(!load.is_counted());
    }
}
