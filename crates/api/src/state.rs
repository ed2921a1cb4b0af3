use std::sync::Arc;

use doclab_core::events::EventBus;
use doclab_core::persistence::DocumentRepository;
use doclab_core::ports::{Analytics, DocumentStore, ObjectStorage};
use doclab_core::uploads::ImageUploader;
use doclab_core::views::ViewCounter;
use jsonwebtoken::DecodingKey;

use crate::config::AppConfig;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    config: AppConfig,
    event_bus: EventBus,
    repository: DocumentRepository,
    views: ViewCounter,
    uploader: ImageUploader,
    decoding_key: DecodingKey,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStorage>,
        analytics: Arc<dyn Analytics>,
        event_bus: EventBus,
    ) -> Self {
        let repository = DocumentRepository::new(store.clone()).with_events(event_bus.clone());
        let views = ViewCounter::new(store, analytics).with_events(event_bus.clone());
        let uploader = ImageUploader::new(storage, config.upload_max_bytes);
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        Self {
            inner: Arc::new(InnerState {
                config,
                event_bus,
                repository,
                views,
                uploader,
                decoding_key,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.event_bus
    }

    pub fn repository(&self) -> &DocumentRepository {
        &self.inner.repository
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        self.inner.repository.store()
    }

    pub fn views(&self) -> &ViewCounter {
        &self.inner.views
    }

    pub fn uploader(&self) -> &ImageUploader {
        &self.inner.uploader
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use doclab_core::ports::NoopAnalytics;
    use doclab_core::store::{MemoryDocumentStore, MemoryObjectStorage};

    /// State over in-memory adapters, returned with handles to them.
    pub fn memory_state() -> (AppState, Arc<MemoryDocumentStore>, Arc<MemoryObjectStorage>) {
        let config = AppConfig::for_tests();
        let store = Arc::new(MemoryDocumentStore::new());
        let storage = Arc::new(MemoryObjectStorage::new(config.public_base_url.clone()));
        let bus = EventBus::new(config.event_bus_capacity);
        let state = AppState::new(
            config,
            store.clone(),
            storage.clone(),
            Arc::new(NoopAnalytics),
            bus,
        );
        (state, store, storage)
    }
}
