//! Presentation Settings Store: fonts, colours, spacing and template choice.
//!
//! The snapshot is a flat JSON object of string values stored under
//! [`SETTINGS_KEY`]. A snapshot is only trusted when its `schemaVersion`
//! matches [`SETTINGS_SCHEMA_VERSION`]; anything else reads as "no saved
//! settings" and the rendered styles stay as they are.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::EditorError;

pub const SETTINGS_KEY: &str = "resumeSettings";
pub const SETTINGS_SCHEMA_VERSION: &str = "1";
pub const DEFAULT_HEADING_COLOR: &str = "#4d44db";
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(300);
const TEMPLATE_CLASS_PREFIX: &str = "template-";

// ────────────────────────────────────────────────────────────────────────────
// Storage capability
// ────────────────────────────────────────────────────────────────────────────

/// Durable key/value storage (browser `localStorage` in the real host).
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), EditorError>;
}

/// Process-local storage. Used when the host has no durable storage, and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EditorError> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Theme capability
// ────────────────────────────────────────────────────────────────────────────

/// Resolves the computed `--primary-color` of a template class.
pub trait ThemeResolver: Send + Sync {
    fn primary_color(&self, template_class: &str) -> Option<String>;
}

/// Fixed class → primary colour table matching the stylesheet's template themes.
#[derive(Debug, Clone)]
pub struct StaticThemes {
    themes: Vec<(String, String)>,
}

impl StaticThemes {
    pub fn new(themes: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            themes: themes.into_iter().collect(),
        }
    }
}

impl Default for StaticThemes {
    fn default() -> Self {
        Self::new(
            [
                ("template-professional", "#2c3e50"),
                ("template-modern", "#4d44db"),
                ("template-creative", "#e4572e"),
                ("template-minimal", "#333333"),
            ]
            .into_iter()
            .map(|(class, color)| (class.to_string(), color.to_string())),
        )
    }
}

impl ThemeResolver for StaticThemes {
    fn primary_color(&self, template_class: &str) -> Option<String> {
        self.themes
            .iter()
            .find(|(class, _)| class == template_class)
            .map(|(_, color)| color.clone())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// The settings snapshot. `None` means "not recorded", never "reset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationSettings {
    #[serde(rename = "fontSize", skip_serializing_if = "Option::is_none")]
    pub font_size_px: Option<String>,
    #[serde(rename = "fontFamily", skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(rename = "fontColor", skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(rename = "bgColor", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(rename = "headingColor", skip_serializing_if = "Option::is_none")]
    pub heading_color: Option<String>,
    #[serde(rename = "lineHeight", skip_serializing_if = "Option::is_none")]
    pub line_height: Option<String>,
    #[serde(rename = "textAlign", skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    #[serde(rename = "template", skip_serializing_if = "Option::is_none")]
    pub active_template: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSettings {
    #[serde(rename = "schemaVersion")]
    schema_version: Option<String>,
    #[serde(flatten)]
    settings: PresentationSettings,
}

/// Inline styles on the rendered resume, as the rasterizer will see them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSurface {
    pub font_size: String,
    pub font_family: String,
    pub color: String,
    pub background_color: String,
    /// Background of the `.resume-template` root, kept in step with the canvas.
    pub template_background: String,
    /// Colour of every `.section-title`.
    pub heading_color: String,
    pub line_height: String,
    pub text_align: String,
    pub template_class: String,
}

/// Current values of the settings panel's inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Controls {
    pub font_size: String,
    pub font_family: String,
    pub font_color: String,
    pub background_color: String,
    pub heading_color: String,
    pub line_height: String,
    /// The active alignment button, if any.
    pub text_align: Option<String>,
    /// The active template card, if any.
    pub active_template: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SettingsStore {
    storage: Arc<dyn KeyValueStorage>,
    themes: Arc<dyn ThemeResolver>,
}

impl SettingsStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, themes: Arc<dyn ThemeResolver>) -> Self {
        Self { storage, themes }
    }

    /// Reads every control into a snapshot. Empty inputs are left unrecorded.
    pub fn snapshot(controls: &Controls) -> PresentationSettings {
        PresentationSettings {
            font_size_px: non_empty(&controls.font_size),
            font_family: non_empty(&controls.font_family),
            font_color: non_empty(&controls.font_color),
            background_color: non_empty(&controls.background_color),
            heading_color: non_empty(&controls.heading_color),
            line_height: non_empty(&controls.line_height),
            text_align: controls.text_align.clone(),
            active_template: controls.active_template.clone(),
        }
    }

    /// Writes present fields to the surface and the matching controls.
    ///
    /// The template is applied first so an explicit heading colour in the same
    /// snapshot wins over the template's primary colour.
    pub fn apply(
        &self,
        surface: &mut StyleSurface,
        controls: &mut Controls,
        settings: &PresentationSettings,
    ) {
        if let Some(template) = &settings.active_template {
            if let Err(e) = self.switch_template(surface, controls, template) {
                warn!("Ignoring saved template: {e}");
            }
        }
        if let Some(px) = &settings.font_size_px {
            controls.font_size = px.clone();
            surface.font_size = format!("{px}px");
        }
        if let Some(family) = &settings.font_family {
            controls.font_family = family.clone();
            surface.font_family = family.clone();
        }
        if let Some(color) = &settings.font_color {
            controls.font_color = color.clone();
            surface.color = color.clone();
        }
        if let Some(bg) = &settings.background_color {
            controls.background_color = bg.clone();
            surface.background_color = bg.clone();
            surface.template_background = bg.clone();
        }
        if let Some(color) = &settings.heading_color {
            controls.heading_color = color.clone();
            surface.heading_color = color.clone();
        }
        if let Some(lh) = &settings.line_height {
            controls.line_height = lh.clone();
            surface.line_height = lh.clone();
        }
        if let Some(align) = &settings.text_align {
            controls.text_align = Some(align.clone());
            surface.text_align = align.clone();
        }
    }

    /// Persists a full snapshot of the controls, replacing any earlier one.
    pub fn save(&self, controls: &Controls) -> Result<PresentationSettings, EditorError> {
        let settings = Self::snapshot(controls);
        persist(self.storage.as_ref(), &settings)?;
        Ok(settings)
    }

    /// Reads the stored snapshot. Missing, malformed or foreign-version data is `None`.
    pub fn load(&self) -> Option<PresentationSettings> {
        let raw = self.storage.get(SETTINGS_KEY)?;
        let stored: StoredSettings = match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(e) => {
                debug!("Discarding malformed settings snapshot: {e}");
                return None;
            }
        };
        if stored.schema_version.as_deref() != Some(SETTINGS_SCHEMA_VERSION) {
            warn!(
                "Discarding settings snapshot with schema version {:?}",
                stored.schema_version
            );
            return None;
        }
        Some(stored.settings)
    }

    /// Loads and applies the stored snapshot. Returns whether anything was applied.
    pub fn load_into(&self, surface: &mut StyleSurface, controls: &mut Controls) -> bool {
        match self.load() {
            Some(settings) => {
                self.apply(surface, controls, &settings);
                true
            }
            None => false,
        }
    }

    /// Replaces the template class and recolours headings with the template's primary colour.
    pub fn switch_template(
        &self,
        surface: &mut StyleSurface,
        controls: &mut Controls,
        name: &str,
    ) -> Result<String, EditorError> {
        let class = format!("{TEMPLATE_CLASS_PREFIX}{name}");
        let primary = self
            .themes
            .primary_color(&class)
            .ok_or_else(|| EditorError::UnsupportedTemplate(name.to_string()))?;

        surface.template_class = class;
        surface.heading_color = primary.clone();
        controls.heading_color = primary.clone();
        controls.active_template = Some(name.to_string());
        info!("Switched to template '{name}' (primary {primary})");
        Ok(primary)
    }

    pub(crate) fn storage(&self) -> Arc<dyn KeyValueStorage> {
        self.storage.clone()
    }
}

fn persist(storage: &dyn KeyValueStorage, settings: &PresentationSettings) -> Result<(), EditorError> {
    let stored = StoredSettings {
        schema_version: Some(SETTINGS_SCHEMA_VERSION.to_string()),
        settings: settings.clone(),
    };
    let json = serde_json::to_string(&stored).map_err(|e| EditorError::Storage(e.to_string()))?;
    storage.set(SETTINGS_KEY, &json)
}

// ────────────────────────────────────────────────────────────────────────────
// Debounced autosave
// ────────────────────────────────────────────────────────────────────────────

/// Coalesces bursts of control changes into one write after a quiet period.
///
/// Outside a Tokio runtime there is nothing to debounce on, so each snapshot
/// is written immediately.
pub struct Autosave {
    storage: Arc<dyn KeyValueStorage>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Autosave {
    pub fn new(store: &SettingsStore, delay: Duration) -> Self {
        Self {
            storage: store.storage(),
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Schedules `settings` to be written once no newer snapshot arrives within the delay.
    pub fn schedule(&self, settings: PresentationSettings) {
        let Ok(runtime) = Handle::try_current() else {
            self.cancel();
            if let Err(e) = persist(self.storage.as_ref(), &settings) {
                warn!("Autosave failed: {e}");
            }
            return;
        };
        let storage = self.storage.clone();
        let delay = self.delay;
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = persist(storage.as_ref(), &settings) {
                warn!("Autosave failed: {e}");
            }
        });

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.replace(task) {
            previous.abort();
        }
    }

    /// Drops the pending write, if any. Returns whether one was still waiting.
    pub fn cancel(&self) -> bool {
        let task = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        match task {
            Some(task) if !task.is_finished() => {
                task.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        if let Some(task) = self.pending.get_mut().ok().and_then(Option::take) {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (SettingsStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (
            SettingsStore::new(storage.clone(), Arc::new(StaticThemes::default())),
            storage,
        )
    }

    fn rendered() -> (StyleSurface, Controls) {
        let surface = StyleSurface {
            font_size: "14px".to_string(),
            font_family: "Inter".to_string(),
            color: "#222222".to_string(),
            background_color: "#ffffff".to_string(),
            template_background: "#ffffff".to_string(),
            heading_color: "#4d44db".to_string(),
            line_height: "1.5".to_string(),
            text_align: "left".to_string(),
            template_class: "template-modern".to_string(),
        };
        let controls = Controls {
            font_size: "14".to_string(),
            font_family: "Inter".to_string(),
            font_color: "#222222".to_string(),
            background_color: "#ffffff".to_string(),
            heading_color: "#4d44db".to_string(),
            line_height: "1.5".to_string(),
            text_align: None,
            active_template: None,
        };
        (surface, controls)
    }

    #[test]
    fn test_save_then_load_round_trips_every_field() {
        let (store, _) = store();
        let (_, mut controls) = rendered();
        controls.font_size = "16".to_string();
        controls.font_family = "Georgia, serif".to_string();
        controls.font_color = "#101010".to_string();
        controls.background_color = "#fafafa".to_string();
        controls.line_height = "1.8".to_string();
        controls.text_align = Some("justify".to_string());
        controls.active_template = Some("professional".to_string());
        controls.heading_color = "#aa0000".to_string();

        let saved = store.save(&controls).unwrap();

        let (mut fresh_surface, mut fresh_controls) = rendered();
        assert!(store.load_into(&mut fresh_surface, &mut fresh_controls));

        assert_eq!(fresh_controls, controls);
        assert_eq!(SettingsStore::snapshot(&fresh_controls), saved);
        assert_eq!(fresh_surface.font_size, "16px");
        assert_eq!(fresh_surface.heading_color, "#aa0000");
        assert_eq!(fresh_surface.template_class, "template-professional");
        assert_eq!(fresh_surface.template_background, "#fafafa");
        assert_eq!(fresh_surface.text_align, "justify");
    }

    #[test]
    fn test_load_without_save_leaves_rendered_values() {
        let (store, _) = store();
        let (mut surface, mut controls) = rendered();
        let (expected_surface, expected_controls) = rendered();

        assert!(!store.load_into(&mut surface, &mut controls));
        assert_eq!(surface, expected_surface);
        assert_eq!(controls, expected_controls);
    }

    #[test]
    fn test_malformed_snapshot_is_treated_as_absent() {
        let (store, storage) = store();
        storage.set(SETTINGS_KEY, "{not json").unwrap();
        assert!(store.load().is_none());

        storage
            .set(SETTINGS_KEY, r#"{"schemaVersion":"1","fontSize":14}"#)
            .unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_unversioned_snapshot_is_ignored() {
        let (store, storage) = store();
        storage
            .set(SETTINGS_KEY, r##"{"fontSize":"18","bgColor":"#000000"}"##)
            .unwrap();
        let (mut surface, mut controls) = rendered();
        assert!(!store.load_into(&mut surface, &mut controls));
        assert_eq!(surface.font_size, "14px");
    }

    #[test]
    fn test_apply_is_partial() {
        let (store, _) = store();
        let (mut surface, mut controls) = rendered();
        let settings = PresentationSettings {
            font_color: Some("#ff0000".to_string()),
            ..Default::default()
        };
        store.apply(&mut surface, &mut controls, &settings);

        let (mut expected, _) = rendered();
        expected.color = "#ff0000".to_string();
        assert_eq!(surface, expected);
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let (store, _) = store();
        let (_, mut controls) = rendered();
        controls.text_align = Some("center".to_string());
        store.save(&controls).unwrap();

        controls.text_align = None;
        store.save(&controls).unwrap();

        assert_eq!(store.load().unwrap().text_align, None);
    }

    #[test]
    fn test_switch_template_recolours_headings_and_control() {
        let (store, _) = store();
        let (mut surface, mut controls) = rendered();
        let primary = store
            .switch_template(&mut surface, &mut controls, "professional")
            .unwrap();
        assert_eq!(primary, "#2c3e50");
        assert_eq!(surface.template_class, "template-professional");
        assert_eq!(surface.heading_color, controls.heading_color);
        assert_eq!(controls.active_template.as_deref(), Some("professional"));
    }

    #[test]
    fn test_switch_to_unknown_template_changes_nothing() {
        let (store, _) = store();
        let (mut surface, mut controls) = rendered();
        let err = store
            .switch_template(&mut surface, &mut controls, "baroque")
            .unwrap_err();
        assert_eq!(err, EditorError::UnsupportedTemplate("baroque".to_string()));
        assert_eq!(surface.template_class, "template-modern");
    }

    #[test]
    fn test_snapshot_serializes_flat_string_map() {
        let (store, storage) = store();
        let (_, controls) = rendered();
        store.save(&controls).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&storage.get(SETTINGS_KEY).unwrap()).unwrap();
        let map = raw.as_object().unwrap();
        assert!(map.values().all(|v| v.is_string()));
        assert_eq!(map["schemaVersion"], "1");
        assert_eq!(map["fontSize"], "14");
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_coalesces_bursts() {
        let (store, storage) = store();
        let autosave = Autosave::new(&store, DEFAULT_AUTOSAVE_DELAY);
        let (_, mut controls) = rendered();

        controls.font_size = "15".to_string();
        autosave.schedule(SettingsStore::snapshot(&controls));
        tokio::time::sleep(Duration::from_millis(100)).await;
        controls.font_size = "16".to_string();
        autosave.schedule(SettingsStore::snapshot(&controls));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(storage.write_count(), 0);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(storage.write_count(), 1);
        assert_eq!(store.load().unwrap().font_size_px.as_deref(), Some("16"));
        assert!(!autosave.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_write() {
        let (store, storage) = store();
        let autosave = Autosave::new(&store, DEFAULT_AUTOSAVE_DELAY);
        let (_, controls) = rendered();

        autosave.schedule(SettingsStore::snapshot(&controls));
        assert!(autosave.cancel());
        assert!(!autosave.cancel());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn test_autosave_without_runtime_writes_immediately() {
        let (store, storage) = store();
        let autosave = Autosave::new(&store, DEFAULT_AUTOSAVE_DELAY);
        let (_, mut controls) = rendered();
        controls.font_size = "17".to_string();

        autosave.schedule(SettingsStore::snapshot(&controls));

        assert_eq!(storage.write_count(), 1);
        assert!(!autosave.is_pending());
        assert_eq!(store.load().unwrap().font_size_px.as_deref(), Some("17"));
    }
}
