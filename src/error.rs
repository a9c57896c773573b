//! Error taxonomy for the export pipeline.
//!
//! Every failure the pipeline can produce is caught at the export boundary and
//! surfaced as one of these variants so the caller can distinguish a retryable
//! condition (a rasterization hiccup, a busy host) from a fatal one (degenerate
//! geometry, PDF assembly failure). No variant ever carries a partial output.

use thiserror::Error;

/// All errors the export pipeline can surface.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Another export currently holds the offscreen render host.
    #[error("an export is already in progress")]
    Busy,

    /// The export was cancelled at a suspension point.
    #[error("export was cancelled")]
    Cancelled,

    /// The offscreen container could not be attached. Fatal to this attempt;
    /// not retried automatically.
    #[error("render host mount failed: {0}")]
    RenderMount(String),

    /// Zero-height or otherwise failed capture. The caller may retry, e.g.
    /// after the content finishes loading.
    #[error("rasterization failed: {0}")]
    Rasterization(String),

    /// Degenerate raster input (zero width). Fatal.
    #[error("band plan computation failed: {0}")]
    SliceComputation(String),

    /// PDF library failure during page add or finalize.
    #[error("PDF assembly failed: {0}")]
    Assembly(String),
}
