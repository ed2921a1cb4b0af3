//! Contracts for the hosted collaborators: document store, object storage,
//! analytics sink and the on-device draft store.

pub mod analytics;
pub mod document_store;
pub mod draft_store;
pub mod object_storage;

pub use analytics::{Analytics, NoopAnalytics};
pub use document_store::{DocumentStore, ListFilter, OrderBy};
pub use draft_store::DraftStore;
pub use object_storage::{ObjectStorage, StoredObject};
