//! Read-only navigation over a document's sections.
//!
//! The current section comes from the `section` selector when it names an
//! existing section, otherwise the first one. Navigation stops at both ends.
//! Only the first section carries the document header.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::document::model::Document;
use crate::document::section::{RenderedContent, Section};

/// Query parameter carrying the selected section id.
pub const SECTION_QUERY_PARAM: &str = "section";

/// Host-side addressable state (e.g. the browser URL) that mirrors the selection.
pub trait Location {
    fn set_query_param(&mut self, key: &str, value: &str);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHeader {
    pub title: String,
    pub authors: Vec<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub view_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SectionView {
    /// The document has no sections.
    #[serde(rename_all = "camelCase")]
    Empty { title: String },
    #[serde(rename_all = "camelCase")]
    Section {
        header: Option<DocumentHeader>,
        section_id: String,
        title: String,
        /// 1-based position.
        position: usize,
        total: usize,
        content: RenderedContent,
        previous_id: Option<String>,
        next_id: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Navigator<'a> {
    document: &'a Document,
    current: Option<usize>,
}

impl<'a> Navigator<'a> {
    pub fn open(document: &'a Document, selector: Option<&str>) -> Self {
        let current = selector
            .and_then(|id| document.position(id))
            .or(if document.sections.is_empty() { None } else { Some(0) });
        Self { document, current }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_section(&self) -> Option<&'a Section> {
        self.current.map(|i| &self.document.sections[i])
    }

    /// Select by id. Unknown ids leave the selection unchanged and return `false`.
    pub fn select_section(&mut self, id: &str) -> bool {
        match self.document.position(id) {
            Some(index) => {
                self.current = Some(index);
                true
            }
            None => false,
        }
    }

    /// Select by id and mirror the choice into the host location.
    pub fn select_section_at(&mut self, id: &str, location: &mut dyn Location) -> bool {
        if !self.select_section(id) {
            return false;
        }
        location.set_query_param(SECTION_QUERY_PARAM, id);
        true
    }

    pub fn next(&mut self) -> bool {
        match self.current {
            Some(i) if i + 1 < self.document.sections.len() => {
                self.current = Some(i + 1);
                true
            }
            _ => false,
        }
    }

    pub fn previous(&mut self) -> bool {
        match self.current {
            Some(i) if i > 0 => {
                self.current = Some(i - 1);
                true
            }
            _ => false,
        }
    }

    /// `section=<id>` for the current selection.
    pub fn selector_query(&self) -> Option<String> {
        self.current_section()
            .map(|s| format!("{SECTION_QUERY_PARAM}={}", s.id))
    }

    pub fn render(&self) -> SectionView {
        let doc = self.document;
        let Some(index) = self.current else {
            return SectionView::Empty {
                title: doc.title.clone(),
            };
        };
        let section = &doc.sections[index];
        let header = (index == 0).then(|| DocumentHeader {
            title: doc.title.clone(),
            authors: doc.authors.clone(),
            last_updated: doc.last_updated,
            view_count: doc.view_count,
        });
        SectionView::Section {
            header,
            section_id: section.id.clone(),
            title: section.title.clone(),
            position: index + 1,
            total: doc.sections.len(),
            content: section.content.render(),
            previous_id: index.checked_sub(1).map(|i| doc.sections[i].id.clone()),
            next_id: doc.sections.get(index + 1).map(|s| s.id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::DocumentKind;
    use crate::document::section::Content;

    fn abc() -> Document {
        let mut doc = Document::new(DocumentKind::Codelab, "Guide", vec!["Ada".into()]);
        doc.sections = ["A", "B", "C"]
            .iter()
            .enumerate()
            .map(|(i, t)| Section {
                id: (i + 1).to_string(),
                order: i as u32 + 1,
                title: t.to_string(),
                content: Content::Html(format!("<p>{t}</p>")),
            })
            .collect();
        doc
    }

    #[derive(Default)]
    struct FakeUrl(Vec<(String, String)>);

    impl Location for FakeUrl {
        fn set_query_param(&mut self, key: &str, value: &str) {
            self.0.push((key.to_string(), value.to_string()));
        }
    }

    fn current_title(nav: &Navigator<'_>) -> String {
        nav.current_section().unwrap().title.clone()
    }

    #[test]
    fn selector_picks_section_and_next_stops_at_end() {
        let doc = abc();
        let mut nav = Navigator::open(&doc, Some("2"));
        assert_eq!(current_title(&nav), "B");
        assert!(nav.next());
        assert_eq!(current_title(&nav), "C");
        assert!(!nav.next());
        assert_eq!(current_title(&nav), "C");
    }

    #[test]
    fn unknown_or_missing_selector_falls_back_to_first() {
        let doc = abc();
        assert_eq!(current_title(&Navigator::open(&doc, Some("99"))), "A");
        let mut nav = Navigator::open(&doc, None);
        assert_eq!(current_title(&nav), "A");
        assert!(!nav.previous());
        assert_eq!(nav.current_index(), Some(0));
    }

    #[test]
    fn selection_is_reflected_in_location() {
        let doc = abc();
        let mut nav = Navigator::open(&doc, None);
        let mut url = FakeUrl::default();

        assert!(nav.select_section_at("3", &mut url));
        assert!(!nav.select_section_at("nope", &mut url));
        assert_eq!(url.0, vec![("section".to_string(), "3".to_string())]);
        assert_eq!(nav.selector_query().as_deref(), Some("section=3"));
    }

    #[test]
    fn only_first_section_has_header() {
        let mut doc = abc();
        doc.view_count = 7;
        let mut nav = Navigator::open(&doc, None);

        match nav.render() {
            SectionView::Section {
                header: Some(h),
                position,
                previous_id,
                next_id,
                ..
            } => {
                assert_eq!(h.title, "Guide");
                assert_eq!(h.view_count, 7);
                assert_eq!(position, 1);
                assert_eq!(previous_id, None);
                assert_eq!(next_id.as_deref(), Some("2"));
            }
            other => panic!("unexpected view {other:?}"),
        }

        nav.next();
        match nav.render() {
            SectionView::Section {
                header, content, ..
            } => {
                assert!(header.is_none());
                assert_eq!(content, RenderedContent::Html("<p>B</p>".into()));
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn empty_document_renders_placeholder() {
        let doc = Document::new(DocumentKind::Blog, "Empty", vec![]);
        let mut nav = Navigator::open(&doc, Some("1"));
        assert!(nav.current_section().is_none());
        assert!(!nav.next());
        assert!(!nav.select_section("1"));
        assert_eq!(
            nav.render(),
            SectionView::Empty {
                title: "Empty".into()
            }
        );
    }
}
