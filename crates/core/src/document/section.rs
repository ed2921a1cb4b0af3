use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::model::DocumentKind;

/// Body given to a freshly added HTML section.
pub const HTML_PLACEHOLDER: &str = "<p>Add your content here...</p>";

/// Body given to a freshly added block-editor section (an empty block list).
pub const BLOCK_TREE_PLACEHOLDER: &str = "[]";

/// Section body. The variant follows the document kind that owns the section:
/// codelabs hold HTML fragments, blogs hold a serialized block tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", content = "body", rename_all = "camelCase")]
pub enum Content {
    Html(String),
    BlockTree(String),
}

/// Content prepared for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", content = "body", rename_all = "camelCase")]
pub enum RenderedContent {
    /// Sanitized HTML.
    Html(String),
    /// Parsed block tree, handed to a block renderer as-is.
    Blocks(Value),
    /// Block tree that did not parse; shown as plain text.
    Text(String),
}

impl Content {
    /// Wrap a raw stored string in the variant matching `kind`.
    pub fn for_kind(kind: DocumentKind, raw: impl Into<String>) -> Self {
        match kind {
            DocumentKind::Codelab => Content::Html(raw.into()),
            DocumentKind::Blog => Content::BlockTree(raw.into()),
        }
    }

    pub fn placeholder(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Codelab => Content::Html(HTML_PLACEHOLDER.to_string()),
            DocumentKind::Blog => Content::BlockTree(BLOCK_TREE_PLACEHOLDER.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Content::Html(s) | Content::BlockTree(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Content::Html(s) | Content::BlockTree(s) => s,
        }
    }

    pub fn render(&self) -> RenderedContent {
        match self {
            Content::Html(html) => RenderedContent::Html(ammonia::clean(html)),
            Content::BlockTree(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(tree) => RenderedContent::Blocks(tree),
                Err(err) => {
                    tracing::debug!("block tree did not parse, rendering as text: {err}");
                    RenderedContent::Text(raw.clone())
                }
            },
        }
    }
}

/// One titled block of a document.
///
/// `order` is the 1-based navigation rank inside the owning document. Blogs do
/// not persist it; it is rebuilt from array position on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub order: u32,
    pub title: String,
    pub content: Content,
}

impl Section {
    /// New section with a fresh id.
    pub fn create(title: impl Into<String>, content: Content, order: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            order,
            title: title.into(),
            content,
        }
    }

    /// Copy with a new title. Blank titles are accepted here and rejected by
    /// validation before any save.
    pub fn renamed(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }

    pub fn with_content(&self, content: Content) -> Self {
        Self {
            content,
            ..self.clone()
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}
