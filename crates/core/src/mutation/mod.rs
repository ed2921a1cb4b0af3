pub mod types;

pub use types::RecordPatch;
