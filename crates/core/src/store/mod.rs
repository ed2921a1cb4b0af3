pub mod fs;
pub mod memory;
pub mod postgres;

pub use fs::{FsDraftStore, FsObjectStorage};
pub use memory::{MemoryDocumentStore, MemoryDraftStore, MemoryObjectStorage};
pub use postgres::PgDocumentStore;
