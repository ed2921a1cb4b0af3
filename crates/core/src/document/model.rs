use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::section::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Codelab,
    Blog,
}

/// Lifecycle state. Any value may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Draft,
    Published,
    Archived,
    Deleted,
    PendingReview,
}

/// Access state, orthogonal to [`Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Unlisted,
}

/// Returned when a stored enum column holds an unknown value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field} value: {value}")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

macro_rules! string_enum {
    ($ty:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(UnknownVariant {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum!(DocumentKind, "kind", { Codelab => "codelab", Blog => "blog" });
string_enum!(Status, "status", {
    Draft => "draft",
    Published => "published",
    Archived => "archived",
    Deleted => "deleted",
    PendingReview => "pending_review",
});
string_enum!(Visibility, "visibility", {
    Public => "public",
    Private => "private",
    Unlisted => "unlisted",
});

/// A codelab or blog held in editor or reader state.
///
/// `id`, `slug`, `creator_id` and the timestamps are `None` until the first
/// save assigns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Option<Uuid>,
    pub kind: DocumentKind,
    pub slug: Option<String>,
    pub title: String,
    pub authors: Vec<String>,
    pub sections: Vec<Section>,
    pub status: Status,
    pub visibility: Visibility,
    pub creator_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub view_count: i64,
}

impl Document {
    /// Unsaved draft with no sections.
    pub fn new(kind: DocumentKind, title: impl Into<String>, authors: Vec<String>) -> Self {
        Self {
            id: None,
            kind,
            slug: None,
            title: title.into(),
            authors,
            sections: Vec::new(),
            status: Status::Draft,
            visibility: Visibility::Public,
            creator_id: None,
            image_url: None,
            last_updated: None,
            created_at: None,
            updated_at: None,
            view_count: 0,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_authors(&mut self, authors: Vec<String>) {
        self.authors = authors;
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    pub fn set_image_url(&mut self, image_url: Option<String>) {
        self.image_url = image_url;
    }

    /// Key used for the on-device draft copy.
    pub fn draft_key(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => format!("unsaved-{}", self.kind),
        }
    }
}

/// Stored shape of a document: scalar columns plus the serialized sections
/// in `content`. Maps to the `documents` PostgreSQL table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub kind: DocumentKind,
    pub slug: String,
    pub title: String,
    pub authors: Vec<String>,
    pub content: String,
    pub last_updated: DateTime<Utc>,
    pub creator_id: Uuid,
    pub status: Status,
    pub visibility: Visibility,
    pub image_url: Option<String>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload. The store assigns id, slug, timestamps and the counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocumentRecord {
    pub kind: DocumentKind,
    pub title: String,
    pub authors: Vec<String>,
    pub content: String,
    pub last_updated: DateTime<Utc>,
    pub creator_id: Uuid,
    pub status: Status,
    pub visibility: Visibility,
    pub image_url: Option<String>,
}

/// Listing row: scalar fields plus the number of sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: Uuid,
    pub kind: DocumentKind,
    pub slug: String,
    pub title: String,
    pub authors: Vec<String>,
    pub status: Status,
    pub visibility: Visibility,
    pub image_url: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub view_count: i64,
    pub section_count: usize,
}
