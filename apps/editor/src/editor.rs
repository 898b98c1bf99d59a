//! `ResumeEditor`: wires the view-model, section manager, settings and exporter together.
//!
//! Hosts call one method per user gesture. Style changes update the live
//! surface immediately and schedule a debounced settings save.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::document::{SectionId, SectionKind};
use crate::error::EditorError;
use crate::export::{
    DocumentAssembler, Downloader, ExportOrchestrator, FontSet, Notifier, Rasterizer,
};
use crate::sections::{Confirm, EditMode, MoveDirection, SectionManager, Viewport};
use crate::settings::{
    Autosave, KeyValueStorage, SettingsStore, ThemeResolver, DEFAULT_AUTOSAVE_DELAY,
    DEFAULT_HEADING_COLOR,
};
use crate::view::{EditorView, RenderedPage};

/// Modal dialog (objective / custom-section forms).
pub trait Dialog: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

/// Every capability the editor needs from its host.
#[derive(Clone)]
pub struct EditorServices {
    pub confirm: Arc<dyn Confirm>,
    pub viewport: Arc<dyn Viewport>,
    pub storage: Arc<dyn KeyValueStorage>,
    pub themes: Arc<dyn ThemeResolver>,
    pub rasterizer: Arc<dyn Rasterizer>,
    pub assembler: Arc<dyn DocumentAssembler>,
    pub downloader: Arc<dyn Downloader>,
    pub notifier: Arc<dyn Notifier>,
    pub fonts: Arc<dyn FontSet>,
    pub objective_dialog: Arc<dyn Dialog>,
    pub custom_section_dialog: Arc<dyn Dialog>,
    pub autosave_delay: Duration,
}

pub struct ResumeEditor {
    view: EditorView,
    sections: SectionManager,
    settings: SettingsStore,
    autosave: Autosave,
    exporter: ExportOrchestrator,
    objective_dialog: Arc<dyn Dialog>,
    custom_section_dialog: Arc<dyn Dialog>,
}

impl ResumeEditor {
    pub fn bind(page: RenderedPage, services: EditorServices) -> Result<Self, EditorError> {
        let (view, seeds) = EditorView::bind(page)?;
        let settings = SettingsStore::new(services.storage, services.themes);
        let delay = if services.autosave_delay.is_zero() {
            DEFAULT_AUTOSAVE_DELAY
        } else {
            services.autosave_delay
        };
        Ok(Self {
            view,
            sections: SectionManager::new(seeds, services.confirm, services.viewport),
            autosave: Autosave::new(&settings, delay),
            settings,
            exporter: ExportOrchestrator::new(
                services.rasterizer,
                services.assembler,
                services.downloader,
                services.notifier,
                services.fonts,
            ),
            objective_dialog: services.objective_dialog,
            custom_section_dialog: services.custom_section_dialog,
        })
    }

    /// Runs once after binding: index, heading colour, then saved settings.
    pub fn init(&mut self) {
        self.sections.reindex();
        if self.view.controls.heading_color.is_empty() {
            self.view.controls.heading_color = DEFAULT_HEADING_COLOR.to_string();
        }
        self.view.surface.heading_color = self.view.controls.heading_color.clone();

        let EditorView {
            controls, surface, ..
        } = &mut self.view;
        if self.settings.load_into(surface, controls) {
            info!("Restored saved presentation settings");
        }
    }

    pub fn view(&self) -> &EditorView {
        &self.view
    }

    pub fn sections(&self) -> &SectionManager {
        &self.sections
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn autosave(&self) -> &Autosave {
        &self.autosave
    }

    // ── edit mode & sections ────────────────────────────────────────────────

    pub fn toggle_edit_mode(&mut self) -> EditMode {
        self.sections.toggle_edit_mode()
    }

    /// Adds a section of the kind currently picked in the "new section" selector.
    pub fn add_selected_section(&mut self) -> Result<SectionId, EditorError> {
        let kind: SectionKind = self.view.new_section_type.parse()?;
        self.sections.add_section(kind)
    }

    pub fn select_new_section_type(&mut self, kind: &str) {
        self.view.new_section_type = kind.to_string();
    }

    pub fn open_objective_dialog(&self) {
        self.objective_dialog.show();
    }

    pub fn save_objective(&mut self, title: &str, content: &str) -> SectionId {
        let id = self.sections.add_objective_section(title, content);
        self.objective_dialog.hide();
        id
    }

    pub fn open_custom_section_dialog(&self) {
        self.custom_section_dialog.show();
    }

    pub fn save_custom_section(&mut self, title: &str, content: &str) -> SectionId {
        let id = self.sections.add_custom_section(title, content);
        self.custom_section_dialog.hide();
        id
    }

    pub fn delete_section(&mut self, id: SectionId) -> Result<bool, EditorError> {
        self.sections.delete_section(id)
    }

    pub fn move_section(
        &mut self,
        id: SectionId,
        direction: MoveDirection,
    ) -> Result<bool, EditorError> {
        self.sections.move_section(id, direction)
    }

    // ── presentation controls ───────────────────────────────────────────────

    pub fn set_font_size(&mut self, px: &str) {
        self.view.controls.font_size = px.to_string();
        self.view.surface.font_size = format!("{px}px");
        self.changed();
    }

    pub fn set_font_family(&mut self, family: &str) {
        self.view.controls.font_family = family.to_string();
        self.view.surface.font_family = family.to_string();
        self.changed();
    }

    pub fn set_font_color(&mut self, color: &str) {
        self.view.controls.font_color = color.to_string();
        self.view.surface.color = color.to_string();
        self.changed();
    }

    pub fn set_background_color(&mut self, color: &str) {
        self.view.controls.background_color = color.to_string();
        self.view.surface.background_color = color.to_string();
        self.view.surface.template_background = color.to_string();
        self.changed();
    }

    pub fn set_heading_color(&mut self, color: &str) {
        self.view.controls.heading_color = color.to_string();
        self.view.surface.heading_color = color.to_string();
        self.changed();
    }

    pub fn set_line_height(&mut self, line_height: &str) {
        self.view.controls.line_height = line_height.to_string();
        self.view.surface.line_height = line_height.to_string();
        self.changed();
    }

    pub fn set_text_align(&mut self, align: &str) {
        self.view.controls.text_align = Some(align.to_string());
        self.view.surface.text_align = align.to_string();
        self.changed();
    }

    pub fn select_template(&mut self, name: &str) -> Result<(), EditorError> {
        let EditorView {
            controls, surface, ..
        } = &mut self.view;
        self.settings.switch_template(surface, controls, name)?;
        self.changed();
        Ok(())
    }

    /// Writes the current controls immediately, bypassing the debounce.
    pub fn save_now(&self) -> Result<(), EditorError> {
        self.settings.save(&self.view.controls).map(|_| ())
    }

    fn changed(&self) {
        self.autosave
            .schedule(SettingsStore::snapshot(&self.view.controls));
    }

    // ── export ──────────────────────────────────────────────────────────────

    /// Writes a still-debouncing settings snapshot now, so an export never
    /// races the autosave.
    fn flush_pending_save(&self) {
        if self.autosave.cancel() {
            if let Err(e) = self.save_now() {
                warn!("Could not persist settings before export: {e}");
            }
        }
    }

    pub async fn export_to_pdf(&self) -> bool {
        self.flush_pending_save();
        self.exporter.export_to_pdf(self.view.template_root()).await
    }

    pub async fn export_to_png(&self) -> bool {
        self.flush_pending_save();
        self.exporter.export_to_png(self.view.template_root()).await
    }
}
