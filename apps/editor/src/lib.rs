//! Vitae Editor: the in-page model behind the resume editing surface.
//!
//! The editor binds to a page rendered by the template server and owns the
//! resume's section order, edit mode, presentation settings and export
//! pipeline for the lifetime of one tab session. Everything the browser
//! provides (storage, rasterization, PDF assembly, dialogs, downloads) is
//! injected through the traits in [`sections`], [`settings`] and [`export`],
//! so a host can wire real implementations and tests can wire doubles.

pub mod document;
pub mod editor;
pub mod error;
pub mod export;
pub mod markup;
pub mod sections;
pub mod settings;
pub mod view;

pub use document::{ResumeDocument, Section, SectionId, SectionKind, SectionSeed};
pub use editor::{Dialog, EditorServices, ResumeEditor};
pub use error::EditorError;
pub use export::{
    Artifact, Bitmap, CaptureOptions, DocumentAssembler, Downloader, ExportOrchestrator, FontSet,
    ImageLoad, ImageResource, Notifier, PageSize, Rasterizer, TemplateRoot,
};
pub use sections::{
    Confirm, EditMode, EditorEvent, IndexEntry, MoveDirection, SectionIndex, SectionManager,
    Viewport,
};
pub use settings::{
    Autosave, Controls, KeyValueStorage, MemoryStorage, PresentationSettings, SettingsStore,
    StaticThemes, StyleSurface, ThemeResolver,
};
pub use view::{EditorView, RenderedPage};
