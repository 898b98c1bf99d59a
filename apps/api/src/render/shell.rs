//! The editor page served at `/resume/:template_id`.
//!
//! The filled template is embedded inside `#resumeCanvas`; everything else is
//! the control panel the editor binds to by element id.

use crate::render::fill::escape_html;

/// Template styles offered by the picker, as `(name, label)`. The canvas
/// carries the style as the class `template-<name>`.
pub const TEMPLATE_STYLES: &[(&str, &str)] = &[
    ("professional", "Professional"),
    ("modern", "Modern"),
    ("creative", "Creative"),
    ("minimal", "Minimal"),
];

pub const DEFAULT_TEMPLATE_STYLE: &str = "modern";
const TEMPLATE_CLASS_PREFIX: &str = "template-";
const DEFAULT_HEADING_COLOR: &str = "#4d44db";

const SECTION_KINDS: &[(&str, &str)] = &[
    ("summary", "Summary"),
    ("experience", "Work Experience"),
    ("education", "Education"),
    ("skills", "Skills"),
];

const ALIGNMENTS: &[&str] = &["left", "center", "right", "justify"];

pub fn editor_shell(template_id: &str, filled: &str) -> String {
    let template_cards: String = TEMPLATE_STYLES
        .iter()
        .map(|(name, label)| {
            let active = if *name == DEFAULT_TEMPLATE_STYLE { " active" } else { "" };
            format!(r#"<div class="template-card{active}" data-template="{name}">{label}</div>"#)
        })
        .collect();
    let section_options: String = SECTION_KINDS
        .iter()
        .map(|(kind, label)| format!(r#"<option value="{kind}">{label}</option>"#))
        .collect();
    let alignment_buttons: String = ALIGNMENTS
        .iter()
        .map(|a| {
            let active = if *a == "left" { " active" } else { "" };
            format!(r#"<button type="button" class="align-btn{active}" data-alignment="{a}">{a}</button>"#)
        })
        .collect();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Resume editor: template {id}</title>
<link rel="stylesheet" href="/css/editor.css">
</head>
<body data-template-id="{id}">
<aside class="settings-panel">
  <button id="toggleEditBtn" type="button">Edit</button>
  <button id="toggleSettingsBtn" type="button">Settings</button>
  <label>Font size <input id="fontSize" type="number" min="8" max="32" value="14"></label>
  <label>Font <select id="fontStyle"><option value="Inter">Inter</option><option value="Georgia">Georgia</option><option value="Roboto">Roboto</option></select></label>
  <label>Text colour <input id="fontColor" type="color" value="#222222"></label>
  <label>Background <input id="bgColor" type="color" value="#ffffff"></label>
  <label>Headings <input id="headingColor" type="color" value="{heading}"></label>
  <label>Line height <input id="lineHeight" type="number" step="0.1" min="1" max="3" value="1.5"></label>
  <div class="alignment">{alignment_buttons}</div>
  <div class="templates">{template_cards}</div>
  <select id="newSectionType">{section_options}</select>
  <button id="addSectionBtn" type="button">Add section</button>
  <button id="addObjectiveBtn" type="button">Add objective</button>
  <button id="addCustomSectionBtn" type="button">Add custom section</button>
  <ul id="sectionList"></ul>
  <button id="downloadPdfBtn" type="button">Download PDF</button>
  <button id="downloadPngBtn" type="button">Download PNG</button>
</aside>
<main id="resumeCanvas" class="{TEMPLATE_CLASS_PREFIX}{style}">
<div class="resume-template"><div class="resume-inner resume-content">
{filled}
</div></div>
</main>
<dialog id="objectiveModal">
  <input id="objectiveTitle" value="Career Objective">
  <textarea id="objectiveContent"></textarea>
  <button id="saveObjectiveBtn" type="button">Save</button>
</dialog>
<dialog id="customSectionModal">
  <input id="customSectionTitle">
  <textarea id="customSectionContent"></textarea>
  <button id="saveCustomSectionBtn" type="button">Save</button>
</dialog>
<script type="module" src="/js/editor.js"></script>
</body>
</html>
"##,
        id = escape_html(template_id),
        style = DEFAULT_TEMPLATE_STYLE,
        heading = DEFAULT_HEADING_COLOR,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_carries_editor_controls() {
        let page = editor_shell("01", "<h1>Jagriti</h1>");
        for id in [
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
        ] {
            assert!(page.contains(&format!(r#"id="{id}""#)), "missing control {id}");
        }
        assert!(page.contains("<h1>Jagriti</h1>"));
        assert!(page.contains(r#"class="template-modern""#));
        assert!(page.contains(r##"id="headingColor" type="color" value="#4d44db""##));
    }

    fn card_values(page: &str) -> Vec<&str> {
        page.split(r#"data-template=""#)
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .collect()
    }

    #[test]
    fn test_template_cards_switch_in_editor() {
        use std::sync::Arc;
        use vitae_editor::settings::DEFAULT_HEADING_COLOR as EDITOR_HEADING_COLOR;
        use vitae_editor::{Controls, MemoryStorage, SettingsStore, StaticThemes, StyleSurface};

        assert_eq!(DEFAULT_HEADING_COLOR, EDITOR_HEADING_COLOR);

        let page = editor_shell("01", "");
        let cards = card_values(&page);
        assert_eq!(cards, vec!["professional", "modern", "creative", "minimal"]);

        let store = SettingsStore::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(StaticThemes::default()),
        );
        for card in cards {
            let mut surface = StyleSurface::default();
            let mut controls = Controls::default();
            store
                .switch_template(&mut surface, &mut controls, card)
                .unwrap();
            assert_eq!(surface.template_class, format!("template-{card}"));
            assert_eq!(controls.active_template.as_deref(), Some(card));
        }
    }

    #[test]
    fn test_shell_escapes_template_id() {
        let page = editor_shell("<script>", "");
        assert!(!page.contains("<script>\""));
        assert!(page.contains("&lt;script&gt;"));
    }
}
