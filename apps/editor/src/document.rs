//! The resume document: an ordered list of titled sections.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::markup::escape_html;

// ────────────────────────────────────────────────────────────────────────────
// Section kinds
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Summary,
    Experience,
    Education,
    Skills,
    Custom,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Summary => "summary",
            SectionKind::Experience => "experience",
            SectionKind::Education => "education",
            SectionKind::Skills => "skills",
            SectionKind::Custom => "custom",
        }
    }

    /// Heading used when a section is created from its skeleton.
    pub fn default_title(&self) -> &'static str {
        match self {
            SectionKind::Summary => "Summary",
            SectionKind::Experience => "Work Experience",
            SectionKind::Education => "Education",
            SectionKind::Skills => "Skills",
            SectionKind::Custom => "Custom Section",
        }
    }

    /// Empty body markup for a freshly added section of this kind.
    pub fn skeleton(&self) -> &'static str {
        match self {
            SectionKind::Summary => "<p></p>",
            SectionKind::Experience => concat!(
                r#"<div class="experience-item">"#,
                r#"<div class="d-flex justify-content-between">"#,
                r#"<h5 class="job-title"></h5><span class="job-period"></span>"#,
                "</div>",
                r#"<p class="company-name"></p>"#,
                r#"<ul class="responsibilities"><li></li><li></li></ul>"#,
                "</div>"
            ),
            SectionKind::Education => concat!(
                r#"<div class="education-item">"#,
                r#"<div class="d-flex justify-content-between"><h5></h5><span></span></div>"#,
                "<p></p>",
                "</div>"
            ),
            SectionKind::Skills => "<ul><li></li><li></li><li></li></ul>",
            SectionKind::Custom => "<div></div>",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(SectionKind::Summary),
            "experience" => Ok(SectionKind::Experience),
            "education" => Ok(SectionKind::Education),
            "skills" => Ok(SectionKind::Skills),
            "custom" => Ok(SectionKind::Custom),
            other => Err(EditorError::UnsupportedSectionKind(other.to_string())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// Session-local identity of a section. Assigned in creation order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(pub u64);

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: SectionId,
    pub kind: SectionKind,
    /// Plain text; escaped when rendered.
    pub title: String,
    /// Template-specific markup fragment.
    pub body: String,
    pub editable: bool,
}

impl Section {
    pub fn to_html(&self) -> String {
        let editable = if self.editable { "true" } else { "false" };
        let delete_display = if self.editable { "flex" } else { "none" };
        format!(
            concat!(
                r#"<div class="section" data-section-id="{id}" data-kind="{kind}">"#,
                r#"<button class="delete-section-btn" title="Delete section" style="display: {display}">&times;</button>"#,
                r#"<h2 class="section-title" contenteditable="{editable}">{title}</h2>"#,
                r#"<div class="section-body" contenteditable="{editable}">{body}</div>"#,
                "</div>"
            ),
            id = self.id.0,
            kind = self.kind,
            display = delete_display,
            editable = editable,
            title = escape_html(&self.title),
            body = self.body,
        )
    }
}

/// A section already present in the rendered template, before the editor assigns ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSeed {
    pub kind: SectionKind,
    pub title: String,
    pub body: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ResumeDocument {
    sections: Vec<Section>,
    next_id: u64,
}

impl ResumeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seeds(seeds: Vec<SectionSeed>) -> Self {
        let mut doc = Self::new();
        for seed in seeds {
            doc.push(seed.kind, seed.title, seed.body, false);
        }
        doc
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn position(&self, id: SectionId) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    /// Section ids in display order.
    pub fn order(&self) -> Vec<SectionId> {
        self.sections.iter().map(|s| s.id).collect()
    }

    pub fn to_html(&self) -> String {
        self.sections.iter().map(Section::to_html).collect()
    }

    pub(crate) fn push(
        &mut self,
        kind: SectionKind,
        title: String,
        body: String,
        editable: bool,
    ) -> SectionId {
        let id = SectionId(self.next_id);
        self.next_id += 1;
        self.sections.push(Section {
            id,
            kind,
            title,
            body,
            editable,
        });
        id
    }

    pub(crate) fn remove(&mut self, id: SectionId) -> Option<Section> {
        let pos = self.position(id)?;
        Some(self.sections.remove(pos))
    }

    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        self.sections.swap(a, b);
    }

    pub(crate) fn set_editable(&mut self, editable: bool) {
        for section in &mut self.sections {
            section.editable = editable;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_kinds() {
        assert_eq!("Skills".parse::<SectionKind>().unwrap(), SectionKind::Skills);
        assert_eq!(
            " experience ".parse::<SectionKind>().unwrap(),
            SectionKind::Experience
        );
    }

    #[test]
    fn test_parse_unknown_kind_fails_fast() {
        let err = "hobbies".parse::<SectionKind>().unwrap_err();
        assert_eq!(err, EditorError::UnsupportedSectionKind("hobbies".to_string()));
    }

    #[test]
    fn test_ids_are_not_reused_after_removal() {
        let mut doc = ResumeDocument::new();
        let a = doc.push(SectionKind::Summary, "A".into(), String::new(), false);
        doc.remove(a);
        let b = doc.push(SectionKind::Summary, "B".into(), String::new(), false);
        assert_ne!(a, b);
    }

    #[test]
    fn test_section_html_escapes_title_and_hides_delete_in_preview() {
        let mut doc = ResumeDocument::new();
        doc.push(SectionKind::Custom, "<b>Awards</b>".into(), "<p>x</p>".into(), false);
        let html = doc.to_html();
        assert!(html.contains("&lt;b&gt;Awards&lt;/b&gt;"));
        assert!(html.contains("display: none"));
        assert!(html.contains(r#"contenteditable="false""#));
        assert!(html.contains("<p>x</p>"));
    }
}
