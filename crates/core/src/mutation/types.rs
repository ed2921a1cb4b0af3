//! Partial update applied to a stored document record.
//! Unset fields are left as stored; set fields overwrite in full, including
//! the whole `content` blob (last write wins).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::model::{DocumentRecord, Status, Visibility};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    /// `Some(None)` clears the cover image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
}

impl RecordPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Names of the columns this patch writes, in a fixed order.
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.authors.is_some() {
            fields.push("authors");
        }
        if self.content.is_some() {
            fields.push("content");
        }
        if self.last_updated.is_some() {
            fields.push("last_updated");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.visibility.is_some() {
            fields.push("visibility");
        }
        if self.image_url.is_some() {
            fields.push("image_url");
        }
        fields
    }

    /// Apply to an in-memory record and bump `updated_at`.
    pub fn apply_to(&self, record: &mut DocumentRecord, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(authors) = &self.authors {
            record.authors = authors.clone();
        }
        if let Some(content) = &self.content {
            record.content = content.clone();
        }
        if let Some(last_updated) = self.last_updated {
            record.last_updated = last_updated;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(visibility) = self.visibility {
            record.visibility = visibility;
        }
        if let Some(image_url) = &self.image_url {
            record.image_url = image_url.clone();
        }
        record.updated_at = now;
    }
}
