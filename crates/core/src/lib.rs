//! Sectioned document model shared by codelabs and blogs.
//!
//! - `document`: sections, content variants, the document aggregate and validation
//! - `codec`: the JSON content blob stored alongside scalar document fields
//! - `editor` / `reader`: the authoring and visiting views over a document
//! - `persistence`: the seam between the aggregate and the document store
//! - `ports` / `store`: collaborator contracts and their adapters

pub mod access;
pub mod auth;
pub mod codec;
pub mod document;
pub mod editor;
pub mod error;
pub mod events;
pub mod mutation;
pub mod persistence;
pub mod ports;
pub mod reader;
pub mod store;
pub mod uploads;
pub mod views;

pub use document::model::{Document, DocumentKind, Status, Visibility};
pub use document::section::{Content, Section};
pub use error::{DocError, ErrorCategory};
