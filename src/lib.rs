//! # pagepress – rendered rich text → paginated A4 PDF
//!
//! This crate implements the export pipeline of a document editor: it takes
//! an edited document's markup snapshot and produces a print-correct,
//! multi-page PDF. The pipeline stages are:
//!
//! 1. **Mount** – materialize the markup in a fixed-width offscreen
//!    container ([`host`], [`layout`])
//! 2. **Rasterize** – capture the whole document into one master raster at
//!    2× oversampling ([`raster`])
//! 3. **Slice** – compute the pixel band of the raster belonging to each
//!    page ([`slicer`])
//! 4. **Composite** – extract each band into its own page raster
//!    ([`compositor`])
//! 5. **Assemble** – place the page rasters into an A4 PDF via printpdf
//!    ([`assembler`])
//!
//! The whole flow is driven by [`pipeline::export_pdf`]. One export runs at
//! a time; concurrent calls are rejected with [`ExportError::Busy`], and a
//! [`CancelToken`] is honored at every suspension point.

pub mod assembler;
pub mod compositor;
pub mod dom;
pub mod error;
pub mod fonts;
pub mod host;
pub mod layout;
pub mod pipeline;
pub mod raster;
pub mod slicer;
pub mod templates;

// Re-exports for convenience
pub use error::ExportError;
pub use pipeline::{compute_band_plan, export_pdf, CancelToken, ExportConfig};
pub use slicer::{BandPolicy, PageBand, PageGeometry};
