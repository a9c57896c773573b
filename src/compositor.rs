//! Page compositor – extracts one band of the master raster into its own
//! page raster.
//!
//! `composite` is a pure function over the immutable master raster: each call
//! reads only its band and writes a fresh buffer, so calls are independent
//! and could run in parallel. The baseline pipeline runs them in band order
//! because the assembler is order-dependent anyway.

use image::{imageops, RgbaImage};

use crate::error::ExportError;
use crate::raster::Raster;
use crate::slicer::PageBand;

/// The extracted sub-image for a single page. Transient; consumed by the
/// assembler and discarded.
pub struct PageRaster {
    pub pixels: RgbaImage,
}

impl PageRaster {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Extract the rectangle `(0, band.source_y, raster.width, band.source_height)`.
pub fn composite(raster: &Raster, band: &PageBand) -> Result<PageRaster, ExportError> {
    let (w, h) = (raster.width(), raster.height());
    if band.source_y + band.source_height > h {
        return Err(ExportError::SliceComputation(format!(
            "band {} [{}, {}) exceeds raster height {}",
            band.index,
            band.source_y,
            band.source_y + band.source_height,
            h
        )));
    }

    let pixels = imageops::crop_imm(&raster.pixels, 0, band.source_y, w, band.source_height)
        .to_image();
    Ok(PageRaster { pixels })
}
