//! Section Manager: structural edits to the resume and the index panel that mirrors them.
//!
//! Invariant: after every structural mutation the index panel lists sections in
//! exactly the document's order. All mutating operations end in `reindex()`.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::document::{ResumeDocument, Section, SectionId, SectionKind, SectionSeed};
use crate::error::EditorError;
use crate::markup::escape_html;

/// Shown in the index panel when the document has no sections.
pub const EMPTY_INDEX_MESSAGE: &str = "No sections added yet";
const UNTITLED_SECTION: &str = "Untitled Section";
const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this section?";
const EVENT_CAPACITY: usize = 64;

// ────────────────────────────────────────────────────────────────────────────
// Capabilities
// ────────────────────────────────────────────────────────────────────────────

/// Interactive yes/no confirmation (a browser `confirm()` in the real host).
pub trait Confirm: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Scrolls the page so the given section is visible.
pub trait Viewport: Send + Sync {
    fn scroll_into_view(&self, section: SectionId);
}

// ────────────────────────────────────────────────────────────────────────────
// State
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Preview,
    Edit,
}

impl EditMode {
    pub fn is_editing(self) -> bool {
        self == EditMode::Edit
    }

    fn toggled(self) -> Self {
        match self {
            EditMode::Preview => EditMode::Edit,
            EditMode::Edit => EditMode::Preview,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Notifications for listeners outside the manager (autosave, host UI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    SectionsChanged,
    ModeChanged(EditMode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub section_id: SectionId,
    pub title: String,
    pub can_move_up: bool,
    pub can_move_down: bool,
}

/// The visible list of sections in the side panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionIndex {
    entries: Vec<IndexEntry>,
}

impl SectionIndex {
    fn build(sections: &[Section]) -> Self {
        let last = sections.len().saturating_sub(1);
        let entries = sections
            .iter()
            .enumerate()
            .map(|(i, s)| IndexEntry {
                section_id: s.id,
                title: if s.title.trim().is_empty() {
                    UNTITLED_SECTION.to_string()
                } else {
                    s.title.trim().to_string()
                },
                can_move_up: i > 0,
                can_move_down: i < last,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn order(&self) -> Vec<SectionId> {
        self.entries.iter().map(|e| e.section_id).collect()
    }

    /// Placeholder text when there is nothing to list.
    pub fn placeholder(&self) -> Option<&'static str> {
        self.entries.is_empty().then_some(EMPTY_INDEX_MESSAGE)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Manager
// ────────────────────────────────────────────────────────────────────────────

pub struct SectionManager {
    document: ResumeDocument,
    index: SectionIndex,
    mode: EditMode,
    confirm: Arc<dyn Confirm>,
    viewport: Arc<dyn Viewport>,
    events: broadcast::Sender<EditorEvent>,
}

impl SectionManager {
    pub fn new(
        seeds: Vec<SectionSeed>,
        confirm: Arc<dyn Confirm>,
        viewport: Arc<dyn Viewport>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let document = ResumeDocument::from_seeds(seeds);
        let index = SectionIndex::build(document.sections());
        Self {
            document,
            index,
            mode: EditMode::Preview,
            confirm,
            viewport,
            events,
        }
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.document
    }

    pub fn index(&self) -> &SectionIndex {
        &self.index
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn delete_controls_visible(&self) -> bool {
        self.mode.is_editing()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.events.subscribe()
    }

    /// Appends an empty section built from the kind's skeleton.
    ///
    /// Custom sections carry user content and go through `add_custom_section`.
    pub fn add_section(&mut self, kind: SectionKind) -> Result<SectionId, EditorError> {
        if kind == SectionKind::Custom {
            return Err(EditorError::UnsupportedSectionKind(
                "custom sections need a title and content".to_string(),
            ));
        }
        Ok(self.append(
            kind,
            kind.default_title().to_string(),
            kind.skeleton().to_string(),
        ))
    }

    /// Appends a custom section. Title and content are treated as plain text.
    pub fn add_custom_section(&mut self, title: &str, content: &str) -> SectionId {
        let title = if title.trim().is_empty() {
            SectionKind::Custom.default_title()
        } else {
            title
        };
        let body = format!("<div>{}</div>", escape_html(content));
        self.append(SectionKind::Custom, title.to_string(), body)
    }

    /// Appends an objective, which is a summary section with user text.
    pub fn add_objective_section(&mut self, title: &str, content: &str) -> SectionId {
        let body = format!("<p>{}</p>", escape_html(content));
        self.append(SectionKind::Summary, title.to_string(), body)
    }

    fn append(&mut self, kind: SectionKind, title: String, body: String) -> SectionId {
        let id = self.document.push(kind, title, body, self.mode.is_editing());
        info!("Added {kind} section {id}");
        self.reindex();
        self.viewport.scroll_into_view(id);
        self.notify(EditorEvent::SectionsChanged);
        id
    }

    /// Removes a section after the user confirms. Returns whether it was removed.
    pub fn delete_section(&mut self, id: SectionId) -> Result<bool, EditorError> {
        if self.document.get(id).is_none() {
            return Err(EditorError::SectionNotFound(id));
        }
        if !self.confirm.confirm(DELETE_CONFIRMATION) {
            debug!("Deletion of section {id} declined");
            return Ok(false);
        }
        self.document.remove(id);
        info!("Deleted section {id}");
        self.reindex();
        self.notify(EditorEvent::SectionsChanged);
        Ok(true)
    }

    /// Swaps a section with its neighbour. Returns false at either end of the list.
    pub fn move_section(
        &mut self,
        id: SectionId,
        direction: MoveDirection,
    ) -> Result<bool, EditorError> {
        let pos = self
            .document
            .position(id)
            .ok_or(EditorError::SectionNotFound(id))?;
        let target = match direction {
            MoveDirection::Up if pos > 0 => pos - 1,
            MoveDirection::Down if pos + 1 < self.document.len() => pos + 1,
            _ => return Ok(false),
        };
        self.document.swap(pos, target);
        self.reindex();
        self.notify(EditorEvent::SectionsChanged);
        Ok(true)
    }

    pub fn reindex(&mut self) {
        self.index = SectionIndex::build(self.document.sections());
    }

    pub fn toggle_edit_mode(&mut self) -> EditMode {
        self.mode = self.mode.toggled();
        self.document.set_editable(self.mode.is_editing());
        debug!("Edit mode is now {:?}", self.mode);
        self.notify(EditorEvent::ModeChanged(self.mode));
        self.mode
    }

    /// Scrolls to the section picked in the index panel.
    pub fn focus(&self, id: SectionId) -> Result<(), EditorError> {
        self.document
            .get(id)
            .ok_or(EditorError::SectionNotFound(id))?;
        self.viewport.scroll_into_view(id);
        Ok(())
    }

    fn notify(&self, event: EditorEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
