use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::document::model::{DocumentKind, Status};

/// Events emitted after document writes, views and analytics calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DocumentEvent {
    Saved(SavedEvent),
    Deleted { document_id: Uuid },
    Viewed { document_id: Uuid, view_count: i64 },
    Analytics(AnalyticsEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedEvent {
    pub document_id: Uuid,
    pub kind: DocumentKind,
    pub status: Status,
    pub created: bool,
    pub section_count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub name: String,
    pub properties: Value,
    pub timestamp: DateTime<Utc>,
}
