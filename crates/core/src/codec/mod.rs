//! Content blob codec.
//!
//! Sections are stored as one JSON string, `{"sections": [...]}`, in the
//! document's `content` column. Codelab sections carry `{id, order, title, content}`;
//! blog sections carry `{id, name, content}` and take their order from array
//! position. Loading never fails: an unreadable blob becomes a single
//! synthesized section.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::document::model::DocumentKind;
use crate::document::section::{Content, Section};
use crate::document::sections::ensure_unique_ids;

/// Title given to the section synthesized from an unreadable blob.
pub const FALLBACK_TITLE: &str = "Content";

/// Body of the synthesized section when the raw blob is not usable as text.
pub const UNREADABLE_PLACEHOLDER: &str =
    "<p>This content could not be loaded. Editing and saving will replace it.</p>";

#[derive(Serialize)]
struct Blob<T> {
    sections: Vec<T>,
}

#[derive(Serialize)]
struct CodelabSectionOut<'a> {
    id: &'a str,
    order: u32,
    title: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct BlogSectionOut<'a> {
    id: &'a str,
    name: &'a str,
    content: &'a str,
}

/// Either wire shape on the way in. Ids may have been written as numbers and
/// block-editor content may be an inline JSON array rather than a string.
#[derive(Deserialize)]
struct SectionIn {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    order: Option<Value>,
    #[serde(default, alias = "name")]
    title: String,
    #[serde(default)]
    content: Option<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BlobIn {
    Wrapped { sections: Vec<SectionIn> },
    Bare(Vec<SectionIn>),
}

/// Serialize sections in their current order.
pub fn serialize_sections(kind: DocumentKind, sections: &[Section]) -> Result<String, serde_json::Error> {
    match kind {
        DocumentKind::Codelab => serde_json::to_string(&Blob {
            sections: sections
                .iter()
                .map(|s| CodelabSectionOut {
                    id: &s.id,
                    order: s.order,
                    title: &s.title,
                    content: s.content.as_str(),
                })
                .collect(),
        }),
        DocumentKind::Blog => serde_json::to_string(&Blob {
            sections: sections
                .iter()
                .map(|s| BlogSectionOut {
                    id: &s.id,
                    name: &s.title,
                    content: s.content.as_str(),
                })
                .collect(),
        }),
    }
}

/// Deserialize a content blob, sorted by order and renumbered `1..=N`.
pub fn deserialize_sections(kind: DocumentKind, raw: &str) -> Vec<Section> {
    let parsed = match serde_json::from_str::<BlobIn>(raw) {
        Ok(BlobIn::Wrapped { sections }) | Ok(BlobIn::Bare(sections)) => sections,
        Err(err) => {
            tracing::warn!("content blob did not parse, synthesizing a section: {err}");
            return vec![fallback_section(kind, raw)];
        }
    };

    let mut sections: Vec<Section> = parsed
        .into_iter()
        .enumerate()
        .map(|(index, s)| Section {
            id: id_text(s.id),
            order: order_rank(s.order).unwrap_or(index as u32 + 1),
            title: s.title,
            content: Content::for_kind(kind, content_text(s.content)),
        })
        .collect();

    sections.sort_by_key(|s| s.order);
    for (index, section) in sections.iter_mut().enumerate() {
        section.order = index as u32 + 1;
    }
    let replaced = ensure_unique_ids(&mut sections);
    if replaced > 0 {
        tracing::warn!(replaced, "content blob repeated section ids, reassigned");
    }
    sections
}

/// Stored ranks that are not a `u32` fall back to array position.
fn order_rank(order: Option<Value>) -> Option<u32> {
    order
        .as_ref()
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}

fn id_text(id: Option<Value>) -> String {
    match id {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => Uuid::new_v4().to_string(),
    }
}

fn content_text(content: Option<Value>) -> String {
    match content {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Plain text is kept as the section body; anything that looks like a broken
/// JSON document, or nothing at all, gets the placeholder.
fn fallback_section(kind: DocumentKind, raw: &str) -> Section {
    let trimmed = raw.trim();
    let looks_structured = trimmed.starts_with('{') || trimmed.starts_with('[');
    let body = if trimmed.is_empty() || looks_structured {
        UNREADABLE_PLACEHOLDER.to_string()
    } else {
        raw.to_string()
    };
    Section::create(FALLBACK_TITLE, Content::for_kind(kind, body), 1)
}
