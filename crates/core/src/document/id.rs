//! Document reference parsing and slug utilities.
//!
//! Documents are addressed either by id or by slug:
//! - Id: a UUID string, e.g. `0b7e...`
//! - Slug: `{title-words}-{first 8 chars of id}`, e.g. `getting-started-0b7e4c1a`

use std::fmt;

use uuid::Uuid;

const SLUG_MAX_LEN: usize = 80;
const SLUG_ID_PREFIX_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentRef {
    Id(Uuid),
    Slug(String),
}

impl DocumentRef {
    /// Parse an id-or-slug path segment.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match Uuid::parse_str(raw) {
            Ok(id) => DocumentRef::Id(id),
            Err(_) => DocumentRef::Slug(raw.to_string()),
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        match self {
            DocumentRef::Id(id) => Some(*id),
            DocumentRef::Slug(_) => None,
        }
    }

    pub fn is_slug(&self) -> bool {
        matches!(self, DocumentRef::Slug(_))
    }
}

impl From<Uuid> for DocumentRef {
    fn from(id: Uuid) -> Self {
        DocumentRef::Id(id)
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentRef::Id(id) => write!(f, "{id}"),
            DocumentRef::Slug(slug) => f.write_str(slug),
        }
    }
}

/// Reduce a title to lowercase dash-separated words.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
        if out.chars().count() >= SLUG_MAX_LEN {
            break;
        }
    }
    out.chars().take(SLUG_MAX_LEN).collect()
}

/// Slug assigned at creation time. The id suffix keeps it unique.
pub fn slug_for(title: &str, id: Uuid) -> String {
    let id_text = id.simple().to_string();
    let suffix = &id_text[..SLUG_ID_PREFIX_LEN];
    let base = slugify(title);
    if base.is_empty() {
        suffix.to_string()
    } else {
        format!("{base}-{suffix}")
    }
}
