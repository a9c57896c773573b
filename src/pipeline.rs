//! Pipeline – ties the render host, rasterizer, slicer, compositor, and
//! assembler into a single export call.
//!
//! The pipeline is single-threaded and cooperative: it suspends at the host
//! settle delay, at rasterization, and at final serialization, and honors a
//! [`CancelToken`] at each of those points. On any failure the error is
//! logged and surfaced; no partial PDF is ever returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::assembler::PdfAssembler;
use crate::compositor;
use crate::error::ExportError;
use crate::host::{self, HostConfig};
use crate::raster;
use crate::slicer::{self, BandPolicy, PageBand, PageGeometry};

/// Cooperative cancellation flag, checked at every suspension point.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<(), ExportError> {
        if self.is_cancelled() {
            Err(ExportError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Configuration for one export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    /// Physical page constants (default: A4, 10 mm margins).
    pub geometry: PageGeometry,
    /// Offscreen container styling.
    pub host: HostConfig,
    /// Oversampling factor for the master raster (default: 2).
    pub scale: f32,
    /// Settle delay after mounting, in milliseconds (default: 300).
    pub settle_ms: u64,
    /// Band slicing policy.
    pub policy: BandPolicy,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            title: "edited_report".to_string(),
            geometry: PageGeometry::a4(),
            host: HostConfig::default(),
            scale: 2.0,
            settle_ms: 300,
            policy: BandPolicy::EqualDivision,
        }
    }
}

impl ExportConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Full pipeline: markup snapshot → paginated PDF bytes.
pub fn export_pdf(
    markup: &str,
    config: &ExportConfig,
    cancel: &CancelToken,
) -> Result<Vec<u8>, ExportError> {
    let result = run_export(markup, config, cancel);
    if let Err(e) = &result {
        log::error!("export failed: {e}");
    }
    result
}

fn run_export(
    markup: &str,
    config: &ExportConfig,
    cancel: &CancelToken,
) -> Result<Vec<u8>, ExportError> {
    cancel.check()?;

    // The handle is held until the bytes exist: releasing the slot earlier
    // would let a second export start while this one is still assembling,
    // with two master rasters live at once.
    let handle = host::mount(markup, &config.host, config.settle(), cancel)?;
    let raster = raster::rasterize(&handle, config.scale)?;
    cancel.check()?;

    let bands = slicer::plan(
        raster.width(),
        raster.height(),
        &config.geometry,
        config.policy,
    )?;

    let mut assembler = PdfAssembler::new(&config.title, config.geometry.clone());
    for band in &bands {
        let page = compositor::composite(&raster, band)?;
        assembler.add_page(&page, placed_height_mm(config, &raster, band))?;
    }

    cancel.check()?;
    let bytes = assembler.finalize()?;
    log::info!("exported {} page(s), {} bytes", bands.len(), bytes.len());
    Ok(bytes)
}

/// Height at which a band is placed on its page.
///
/// Equal-division stretches every band to exactly the printable height – the
/// upstream-faithful approximation. Fixed-capacity keeps the band's natural
/// aspect, so only the final, shorter band ends above the bottom margin.
fn placed_height_mm(config: &ExportConfig, raster: &raster::Raster, band: &PageBand) -> f32 {
    let printable_h = config.geometry.printable_height_mm();
    match config.policy {
        BandPolicy::EqualDivision => printable_h,
        BandPolicy::FixedCapacity => {
            let natural = band.source_height as f32 * config.geometry.printable_width_mm()
                / raster.width() as f32;
            natural.min(printable_h)
        }
    }
}

/// Compute only the band plan for a markup snapshot – what `export_pdf` would
/// paginate, without assembling a PDF. Skips the settle wait (nothing is
/// captured). Useful for inspection and tests.
pub fn compute_band_plan(
    markup: &str,
    config: &ExportConfig,
) -> Result<Vec<PageBand>, ExportError> {
    let cancel = CancelToken::new();
    let handle = host::mount(markup, &config.host, Duration::ZERO, &cancel)?;
    let raster = raster::rasterize(&handle, config.scale)?;
    drop(handle);
    slicer::plan(
        raster.width(),
        raster.height(),
        &config.geometry,
        config.policy,
    )
}
