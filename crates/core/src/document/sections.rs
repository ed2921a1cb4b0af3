//! Section list operations on the document aggregate.
//!
//! `sections` is kept sorted by `order`, and `order` runs `1..=N` without gaps
//! after every operation here.

use std::collections::HashSet;

use uuid::Uuid;

use super::model::Document;
use super::section::{Content, Section};
use crate::error::SectionError;

/// Give a fresh id to every section whose id is blank or already taken by an
/// earlier section. Returns how many ids were replaced.
pub fn ensure_unique_ids(sections: &mut [Section]) -> usize {
    let mut seen = HashSet::with_capacity(sections.len());
    let mut replaced = 0;
    for section in sections.iter_mut() {
        if section.id.trim().is_empty() || !seen.insert(section.id.clone()) {
            section.id = Uuid::new_v4().to_string();
            seen.insert(section.id.clone());
            replaced += 1;
        }
    }
    replaced
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Whether removing the final section is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovePolicy {
    /// Editors: the last section cannot be removed.
    KeepOne,
    AllowEmpty,
}

impl Document {
    /// Order value one greater than the current maximum.
    pub fn next_order(&self) -> u32 {
        self.sections.iter().map(|s| s.order).max().unwrap_or(0) + 1
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_mut(&mut self, id: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    /// Append a section with placeholder content. Existing sections keep their order.
    pub fn add_section(&mut self, title: impl Into<String>) -> &Section {
        let order = self.sections.len() as u32 + 1;
        let section = Section::create(title, Content::placeholder(self.kind), order);
        self.sections.push(section);
        &self.sections[self.sections.len() - 1]
    }

    /// Remove a section and renumber the rest to `1..=N-1`.
    ///
    /// Returns the position the section occupied together with the section.
    pub fn remove_section(
        &mut self,
        id: &str,
        policy: RemovePolicy,
    ) -> Result<(usize, Section), SectionError> {
        let index = self
            .position(id)
            .ok_or_else(|| SectionError::UnknownSection(id.to_string()))?;
        if policy == RemovePolicy::KeepOne && self.sections.len() == 1 {
            return Err(SectionError::LastSection);
        }
        let removed = self.sections.remove(index);
        self.renumber();
        Ok((index, removed))
    }

    /// Swap the order value of a section with its neighbour.
    ///
    /// Returns `false` at either boundary, leaving the document untouched.
    pub fn move_section(&mut self, id: &str, direction: Direction) -> Result<bool, SectionError> {
        let index = self
            .position(id)
            .ok_or_else(|| SectionError::UnknownSection(id.to_string()))?;
        let neighbour = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < self.sections.len() => index + 1,
            _ => return Ok(false),
        };

        let moved_order = self.sections[index].order;
        self.sections[index].order = self.sections[neighbour].order;
        self.sections[neighbour].order = moved_order;
        self.sections.swap(index, neighbour);
        Ok(true)
    }

    /// Replace the title of a section. Blank titles are caught by validation.
    pub fn rename_section(&mut self, id: &str, title: impl Into<String>) -> Result<(), SectionError> {
        let section = self
            .section_mut(id)
            .ok_or_else(|| SectionError::UnknownSection(id.to_string()))?;
        *section = section.renamed(title);
        Ok(())
    }

    pub fn set_section_content(&mut self, id: &str, content: Content) -> Result<(), SectionError> {
        let section = self
            .section_mut(id)
            .ok_or_else(|| SectionError::UnknownSection(id.to_string()))?;
        *section = section.with_content(content);
        Ok(())
    }

    /// Sort by order (stable) and rewrite order values to `1..=N`.
    pub fn renumber(&mut self) {
        self.sections.sort_by_key(|s| s.order);
        for (i, section) in self.sections.iter_mut().enumerate() {
            section.order = i as u32 + 1;
        }
    }
}
