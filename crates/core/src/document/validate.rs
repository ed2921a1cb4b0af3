//! Document validation run before every save.
//! Checks are sequential: title, then authors, then section titles. The first
//! failure is reported and the rest are not examined.

use thiserror::Error;

use super::model::Document;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("document title cannot be empty")]
    EmptyTitle,
    #[error("document needs at least one author")]
    MissingAuthors,
    #[error("author #{} cannot be empty", .index + 1)]
    EmptyAuthor { index: usize },
    #[error("section #{} needs a title", .index + 1)]
    EmptySectionTitle { index: usize, section_id: String },
}

impl ValidationError {
    /// Name of the offending field, for inline error placement.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyTitle => "title",
            ValidationError::MissingAuthors | ValidationError::EmptyAuthor { .. } => "authors",
            ValidationError::EmptySectionTitle { .. } => "sections",
        }
    }
}

/// Validate the fields a document must carry before it can be saved.
pub fn validate_document(doc: &Document) -> Result<(), ValidationError> {
    if doc.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if doc.authors.is_empty() {
        return Err(ValidationError::MissingAuthors);
    }
    if let Some(index) = doc.authors.iter().position(|a| a.trim().is_empty()) {
        return Err(ValidationError::EmptyAuthor { index });
    }
    if let Some((index, section)) = doc
        .sections
        .iter()
        .enumerate()
        .find(|(_, s)| !s.has_title())
    {
        return Err(ValidationError::EmptySectionTitle {
            index,
            section_id: section.id.clone(),
        });
    }
    Ok(())
}
