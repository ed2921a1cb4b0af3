//! Interactive editing over a document's section list.
//!
//! Changes stay in editor state until [`SectionListEditor::save`]; there is
//! no autosave. Collaborators (confirmation prompt, repository, draft store,
//! uploader) are passed into each call that needs them.

use serde_json::{json, Value};

use crate::auth::User;
use crate::document::model::{Document, Status, Visibility};
use crate::document::section::{Content, Section};
use crate::document::sections::{Direction, RemovePolicy};
use crate::document::validate::{validate_document, ValidationError};
use crate::error::{DocError, ErrorCategory, SectionError};
use crate::persistence::{DocumentRepository, SaveOutcome};
use crate::ports::DraftStore;
use crate::uploads::{ImageUploader, UploadKind};

/// Title given to sections added without one.
pub const DEFAULT_SECTION_TITLE: &str = "New Section";

/// Blocking yes/no prompt shown before destructive actions.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Transient message for the host to show (toast or alert).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct SectionListEditor {
    document: Document,
    current: usize,
    dirty: bool,
    notices: Vec<Notice>,
}

impl SectionListEditor {
    /// Open a document for editing. A document without sections gets one.
    pub fn new(mut document: Document) -> Self {
        let mut dirty = false;
        if document.sections.is_empty() {
            document.add_section(DEFAULT_SECTION_TITLE);
            dirty = true;
        }
        Self {
            document,
            current: 0,
            dirty,
            notices: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_section(&self) -> &Section {
        &self.document.sections[self.current]
    }

    /// Unsaved changes exist.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn select(&mut self, id: &str) -> Result<(), SectionError> {
        self.current = self
            .document
            .position(id)
            .ok_or_else(|| SectionError::UnknownSection(id.to_string()))?;
        Ok(())
    }

    /// Append a section and make it current.
    pub fn add_section(&mut self, title: Option<&str>) -> &Section {
        self.document
            .add_section(title.unwrap_or(DEFAULT_SECTION_TITLE));
        self.current = self.document.sections.len() - 1;
        self.dirty = true;
        &self.document.sections[self.current]
    }

    /// Delete after confirmation. Returns `Ok(false)` when the user declines.
    ///
    /// The selection keeps its index; if that index is now past the end it
    /// moves to the last section.
    pub fn delete_section(&mut self, id: &str, confirm: &dyn Confirm) -> Result<bool, SectionError> {
        let title = self
            .document
            .section(id)
            .map(|s| s.title.clone())
            .ok_or_else(|| SectionError::UnknownSection(id.to_string()))?;
        if self.document.sections.len() == 1 {
            self.notices
                .push(Notice::Error(SectionError::LastSection.to_string()));
            return Err(SectionError::LastSection);
        }
        if !confirm.confirm(&format!("Delete section \"{title}\"? This cannot be undone.")) {
            return Ok(false);
        }

        self.document.remove_section(id, RemovePolicy::KeepOne)?;
        let len = self.document.sections.len();
        if self.current >= len {
            self.current = len - 1;
        }
        self.dirty = true;
        Ok(true)
    }

    /// Move a section one step. The selection follows the moved section.
    pub fn move_section(&mut self, id: &str, direction: Direction) -> Result<bool, SectionError> {
        let was_current = self.current_section().id == id;
        let moved = self.document.move_section(id, direction)?;
        if moved {
            if was_current {
                if let Some(index) = self.document.position(id) {
                    self.current = index;
                }
            }
            self.dirty = true;
        }
        Ok(moved)
    }

    /// Stage a new section title. Blank titles are refused.
    pub fn rename_section(&mut self, id: &str, title: &str) -> Result<(), DocError> {
        let index = self
            .document
            .position(id)
            .ok_or_else(|| SectionError::UnknownSection(id.to_string()))?;
        if title.trim().is_empty() {
            return Err(ValidationError::EmptySectionTitle {
                index,
                section_id: id.to_string(),
            }
            .into());
        }
        self.document.rename_section(id, title)?;
        self.dirty = true;
        Ok(())
    }

    /// Stage new body text, wrapped in the variant for this document kind.
    pub fn set_section_content(&mut self, id: &str, raw: impl Into<String>) -> Result<(), SectionError> {
        let content = Content::for_kind(self.document.kind, raw);
        self.document.set_section_content(id, content)?;
        self.dirty = true;
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.document.set_title(title);
        self.dirty = true;
    }

    pub fn set_authors(&mut self, authors: Vec<String>) {
        self.document.set_authors(authors);
        self.dirty = true;
    }

    pub fn set_status(&mut self, status: Status) {
        self.document.set_status(status);
        self.dirty = true;
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.document.set_visibility(visibility);
        self.dirty = true;
    }

    pub fn set_image_url(&mut self, image_url: Option<String>) {
        self.document.set_image_url(image_url);
        self.dirty = true;
    }

    /// Upload an image and append it to the current section.
    pub async fn insert_image(
        &mut self,
        uploader: &ImageUploader,
        user: &User,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, DocError> {
        let image = uploader
            .upload(UploadKind::Inline, user, bytes, content_type)
            .await?;
        let section = &self.document.sections[self.current];
        let id = section.id.clone();
        let updated = with_image(&section.content, &image.url);
        self.document.set_section_content(&id, updated)?;
        self.dirty = true;
        Ok(image.url)
    }

    /// Validate and persist.
    ///
    /// Validation failures never reach the network. When the store cannot be
    /// reached the in-progress document is copied to `drafts`, best effort.
    pub async fn save(
        &mut self,
        repository: &DocumentRepository,
        drafts: Option<&dyn DraftStore>,
        actor: &User,
    ) -> Result<SaveOutcome, DocError> {
        if let Err(err) = validate_document(&self.document) {
            self.notices.push(Notice::Error(err.to_string()));
            return Err(err.into());
        }

        let draft_key = self.document.draft_key();
        match repository.save(&mut self.document, actor).await {
            Ok(outcome) => {
                self.dirty = false;
                self.notices.push(Notice::Success(match outcome {
                    SaveOutcome::Created => "Document created".to_string(),
                    SaveOutcome::Updated => "Changes saved".to_string(),
                }));
                if let Some(drafts) = drafts {
                    if let Err(err) = drafts.discard_draft(&draft_key).await {
                        tracing::debug!("stale draft not removed: {err}");
                    }
                }
                Ok(outcome)
            }
            Err(err) => {
                if err.category() == ErrorCategory::Transport {
                    if let Some(drafts) = drafts {
                        match drafts.save_draft(&draft_key, &self.document).await {
                            Ok(()) => tracing::info!(%draft_key, "save failed, kept local draft"),
                            Err(draft_err) => tracing::warn!("local draft not written: {draft_err}"),
                        }
                    }
                }
                self.notices.push(Notice::Error(err.to_string()));
                Err(err)
            }
        }
    }
}

fn with_image(content: &Content, url: &str) -> Content {
    match content {
        Content::Html(html) => {
            let escaped = url.replace('&', "&amp;").replace('"', "&quot;");
            Content::Html(format!("{html}<img src=\"{escaped}\" alt=\"\" />"))
        }
        Content::BlockTree(raw) => {
            let mut blocks = match serde_json::from_str::<Value>(raw) {
                Ok(Value::Array(blocks)) => blocks,
                _ => Vec::new(),
            };
            blocks.push(json!({ "type": "image", "props": { "url": url } }));
            Content::BlockTree(Value::Array(blocks).to_string())
        }
    }
}
