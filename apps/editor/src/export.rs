//! Export Orchestrator: turns the rendered template root into a PDF or PNG download.
//!
//! Capture only starts once fonts are ready and every image in the root has
//! settled (loaded or failed). Only one export runs at a time; a second
//! request while one is in flight is rejected rather than capturing a
//! half-updated page.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, error, info};

use crate::error::EditorError;

pub const EXPORT_SCALE: f32 = 2.0;
pub const EXPORT_BACKGROUND: &str = "#ffffff";
pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PDF_FILENAME: &str = "resume.pdf";
pub const PNG_FILENAME: &str = "resume.png";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    /// PNG-encoded pixels.
    pub png: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    pub scale: f32,
    /// Opaque fill behind the capture; exports never carry transparency.
    pub background: String,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: EXPORT_SCALE,
            background: EXPORT_BACKGROUND.to_string(),
        }
    }
}

/// A single page sized to hold the whole bitmap at a fixed width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageSize {
    pub fn fit_width(bitmap: &Bitmap) -> Result<Self, EditorError> {
        if bitmap.width == 0 || bitmap.height == 0 {
            return Err(EditorError::Assembly(format!(
                "cannot lay out an empty {}x{} capture",
                bitmap.width, bitmap.height
            )));
        }
        Ok(Self {
            width_mm: PAGE_WIDTH_MM,
            height_mm: f64::from(bitmap.height) * PAGE_WIDTH_MM / f64::from(bitmap.width),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: &'static str,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLoad {
    Loaded,
    Failed,
}

/// The `.resume-template` node that gets captured.
#[derive(Clone)]
pub struct TemplateRoot {
    pub selector: String,
    pub images: Vec<Arc<dyn ImageResource>>,
}

impl std::fmt::Debug for TemplateRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRoot")
            .field("selector", &self.selector)
            .field("images", &self.images.len())
            .finish()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Capabilities
// ────────────────────────────────────────────────────────────────────────────

/// DOM subtree → bitmap.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn capture(
        &self,
        root: &TemplateRoot,
        options: &CaptureOptions,
    ) -> Result<Bitmap, EditorError>;
}

/// Bitmap → paginated document bytes.
#[async_trait]
pub trait DocumentAssembler: Send + Sync {
    async fn from_bitmap(&self, bitmap: &Bitmap, page: PageSize) -> Result<Vec<u8>, EditorError>;
}

/// Hands a finished file to the user.
pub trait Downloader: Send + Sync {
    fn download(&self, artifact: &Artifact) -> Result<(), EditorError>;
}

/// Shows a message to the user (an alert in the real host).
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

#[async_trait]
pub trait FontSet: Send + Sync {
    /// Resolves once all declared fonts have finished loading.
    async fn ready(&self);
}

#[async_trait]
pub trait ImageResource: Send + Sync {
    fn source(&self) -> &str;
    /// Resolves once the image has either loaded or failed.
    async fn settled(&self) -> ImageLoad;
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub struct ExportOrchestrator {
    rasterizer: Arc<dyn Rasterizer>,
    assembler: Arc<dyn DocumentAssembler>,
    downloader: Arc<dyn Downloader>,
    notifier: Arc<dyn Notifier>,
    fonts: Arc<dyn FontSet>,
    busy: AtomicBool,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ExportOrchestrator {
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        assembler: Arc<dyn DocumentAssembler>,
        downloader: Arc<dyn Downloader>,
        notifier: Arc<dyn Notifier>,
        fonts: Arc<dyn FontSet>,
    ) -> Self {
        Self {
            rasterizer,
            assembler,
            downloader,
            notifier,
            fonts,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<BusyGuard<'_>, EditorError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyGuard(&self.busy))
            .map_err(|_| EditorError::ExportInProgress)
    }

    async fn raster(&self, root: Option<&TemplateRoot>) -> Result<Bitmap, EditorError> {
        let root = root.ok_or(EditorError::MissingTemplateRoot)?;

        self.fonts.ready().await;

        let outcomes = join_all(root.images.iter().map(|img| img.settled())).await;
        for (img, outcome) in root.images.iter().zip(&outcomes) {
            if *outcome == ImageLoad::Failed {
                debug!("Image {} failed to load, capturing without it", img.source());
            }
        }
        debug!("{} image(s) settled before capture", outcomes.len());

        self.rasterizer
            .capture(root, &CaptureOptions::default())
            .await
    }

    /// Captures the template root as a bitmap. A failure is logged and shown
    /// to the user once, like the file exports, and also returned.
    pub async fn export_to_raster(
        &self,
        root: Option<&TemplateRoot>,
    ) -> Result<Bitmap, EditorError> {
        let result = match self.begin() {
            Ok(_guard) => self.raster(root).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            self.report(e);
        }
        result
    }

    pub async fn try_export_pdf(
        &self,
        root: Option<&TemplateRoot>,
    ) -> Result<Artifact, EditorError> {
        let _guard = self.begin()?;
        let bitmap = self.raster(root).await?;
        let page = PageSize::fit_width(&bitmap)?;
        let bytes = self.assembler.from_bitmap(&bitmap, page).await?;
        let artifact = Artifact {
            filename: PDF_FILENAME,
            mime: "application/pdf",
            bytes,
        };
        self.downloader.download(&artifact)?;
        info!(
            "Exported {} ({:.1}mm x {:.1}mm)",
            PDF_FILENAME, page.width_mm, page.height_mm
        );
        Ok(artifact)
    }

    pub async fn try_export_png(
        &self,
        root: Option<&TemplateRoot>,
    ) -> Result<Artifact, EditorError> {
        let _guard = self.begin()?;
        let bitmap = self.raster(root).await?;
        let artifact = Artifact {
            filename: PNG_FILENAME,
            mime: "image/png",
            bytes: bitmap.png,
        };
        self.downloader.download(&artifact)?;
        info!("Exported {} ({}x{})", PNG_FILENAME, bitmap.width, bitmap.height);
        Ok(artifact)
    }

    /// Exports a PDF; failures are logged and shown to the user once. Returns success.
    pub async fn export_to_pdf(&self, root: Option<&TemplateRoot>) -> bool {
        let result = self.try_export_pdf(root).await;
        self.settle(result)
    }

    /// Exports a PNG; failures are logged and shown to the user once. Returns success.
    pub async fn export_to_png(&self, root: Option<&TemplateRoot>) -> bool {
        let result = self.try_export_png(root).await;
        self.settle(result)
    }

    fn settle(&self, result: Result<Artifact, EditorError>) -> bool {
        match result {
            Ok(_) => true,
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    fn report(&self, e: &EditorError) {
        error!("Export failed: {e}");
        self.notifier.alert(&e.user_message());
    }
}
