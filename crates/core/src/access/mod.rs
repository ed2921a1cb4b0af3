//! Who may read and who may edit a document.
//!
//! Pure predicates over status, visibility and ownership. Unlisted documents
//! pass `can_view` like public ones; they only differ in [`is_listed`], which
//! is applied when building browse queries.

use uuid::Uuid;

use crate::auth::Viewer;
use crate::document::model::{Document, DocumentRecord, Status, Visibility};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Capability {
    None,
    View,
    Edit,
}

/// Fields the access policy reads.
pub trait Governed {
    fn creator_id(&self) -> Option<Uuid>;
    fn status(&self) -> Status;
    fn visibility(&self) -> Visibility;
}

impl Governed for Document {
    fn creator_id(&self) -> Option<Uuid> {
        self.creator_id
    }

    fn status(&self) -> Status {
        self.status
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }
}

impl Governed for DocumentRecord {
    fn creator_id(&self) -> Option<Uuid> {
        Some(self.creator_id)
    }

    fn status(&self) -> Status {
        self.status
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }
}

pub fn is_owner<D: Governed + ?Sized>(doc: &D, viewer: &Viewer) -> bool {
    match (doc.creator_id(), viewer.user_id()) {
        (Some(owner), Some(uid)) => owner == uid,
        _ => false,
    }
}

pub fn can_view<D: Governed + ?Sized>(doc: &D, viewer: &Viewer) -> bool {
    if is_owner(doc, viewer) {
        return true;
    }
    matches!(doc.visibility(), Visibility::Public | Visibility::Unlisted)
}

pub fn can_edit<D: Governed + ?Sized>(doc: &D, viewer: &Viewer) -> bool {
    is_owner(doc, viewer)
}

pub fn capability<D: Governed + ?Sized>(doc: &D, viewer: &Viewer) -> Capability {
    if can_edit(doc, viewer) {
        Capability::Edit
    } else if can_view(doc, viewer) {
        Capability::View
    } else {
        Capability::None
    }
}

/// Whether a document shows up in browse listings.
pub fn is_listed<D: Governed + ?Sized>(doc: &D) -> bool {
    doc.status() == Status::Published && doc.visibility() == Visibility::Public
}
