//! The editor's view-model: the rendered page's controls and styles, bound once.

use std::collections::BTreeMap;

use tracing::debug;

use crate::document::SectionSeed;
use crate::error::EditorError;
use crate::export::TemplateRoot;
use crate::settings::{Controls, StyleSurface};

/// Element ids the editor cannot work without.
pub const REQUIRED_CONTROLS: [&str; 10] = [
    "toggleEditBtn",
    "resumeCanvas",
    "sectionList",
    "fontSize",
    "fontStyle",
    "fontColor",
    "bgColor",
    "headingColor",
    "lineHeight",
    "newSectionType",
];

/// What the host found on the page after the server-rendered markup loaded.
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    /// Control element id → current value. Elements without a value map to "".
    pub controls: BTreeMap<String, String>,
    /// Id of the active alignment button's alignment, if one is marked active.
    pub active_alignment: Option<String>,
    /// Name of the active template card, if one is marked active.
    pub active_template: Option<String>,
    pub surface: StyleSurface,
    pub sections: Vec<SectionSeed>,
    pub template_root: Option<TemplateRoot>,
}

#[derive(Debug, Clone)]
pub struct EditorView {
    pub controls: Controls,
    pub surface: StyleSurface,
    pub new_section_type: String,
    template_root: Option<TemplateRoot>,
}

impl EditorView {
    /// Binds to the page, failing on the first required control that is missing.
    ///
    /// Returns the view and the sections found in the markup.
    pub fn bind(page: RenderedPage) -> Result<(Self, Vec<SectionSeed>), EditorError> {
        let RenderedPage {
            controls,
            active_alignment,
            active_template,
            surface,
            sections,
            template_root,
        } = page;

        let value = |id: &str| -> Result<String, EditorError> {
            controls
                .get(id)
                .cloned()
                .ok_or_else(|| EditorError::MissingControl(id.to_string()))
        };

        for id in REQUIRED_CONTROLS {
            value(id)?;
        }

        let view = Self {
            controls: Controls {
                font_size: value("fontSize")?,
                font_family: value("fontStyle")?,
                font_color: value("fontColor")?,
                background_color: value("bgColor")?,
                heading_color: value("headingColor")?,
                line_height: value("lineHeight")?,
                text_align: active_alignment,
                active_template,
            },
            surface,
            new_section_type: value("newSectionType")?,
            template_root,
        };
        debug!(
            "Bound editor view with {} section(s), template root present: {}",
            sections.len(),
            view.template_root.is_some()
        );
        Ok((view, sections))
    }

    pub fn template_root(&self) -> Option<&TemplateRoot> {
        self.template_root.as_ref()
    }
}
