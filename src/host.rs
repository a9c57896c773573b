//! Offscreen render host – a scoped, process-wide singleton resource.
//!
//! Mounting renders the markup snapshot into a detached surface with a fixed
//! logical width and explicit colors, so rasterization does not depend on any
//! ambient theme or viewport state. Exactly one host may be mounted at a time;
//! a concurrent mount is rejected with [`ExportError::Busy`] rather than
//! queued, since two live hosts would double the raster memory. The slot is
//! released when the [`RenderHandle`] drops, on the success and failure paths
//! alike.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dom;
use crate::error::ExportError;
use crate::fonts::TextMetrics;
use crate::layout::{self, Surface};
use crate::pipeline::CancelToken;

/// The one host slot for the whole process.
static HOST_SLOT: Mutex<()> = Mutex::new(());

/// Offscreen container styling. Colors are explicit so the export never
/// inherits a dark-mode palette.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Fixed logical width of the container.
    pub width: f32,
    /// Padding on all sides.
    pub padding: f32,
    /// Line-height multiplier.
    pub line_height: f32,
    /// Background RGB.
    pub background: [u8; 3],
    /// Foreground RGB used for greeked text boxes.
    pub foreground: [u8; 3],
    /// Optional TTF/OTF file for accurate text measurement; heuristic
    /// metrics are used when absent.
    #[serde(default)]
    pub font: Option<PathBuf>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            padding: 30.0,
            line_height: 1.6,
            background: [255, 255, 255],
            foreground: [0, 0, 0],
            font: None,
        }
    }
}

/// A mounted offscreen surface. Holds the host slot until dropped.
pub struct RenderHandle {
    pub(crate) surface: Surface,
    pub(crate) config: HostConfig,
    _slot: MutexGuard<'static, ()>,
}

impl RenderHandle {
    /// Measured content height in logical units (zero if nothing rendered).
    pub fn content_height(&self) -> f32 {
        self.surface.content_height
    }
}

/// Mount the markup into the offscreen host and let it settle.
///
/// The settle delay is a bounded fixed wait tolerating asynchronous
/// sub-resource loading in the markup. It is a best-effort approximation,
/// not a load-completion signal; pass [`Duration::ZERO`] when the content is
/// known to be static (tests do).
pub fn mount(
    markup: &str,
    config: &HostConfig,
    settle: Duration,
    cancel: &CancelToken,
) -> Result<RenderHandle, ExportError> {
    let slot = match HOST_SLOT.try_lock() {
        Ok(guard) => guard,
        Err(TryLockError::WouldBlock) => return Err(ExportError::Busy),
        // A panicked export must not wedge the slot; the () inside carries
        // no state to repair.
        Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
    };

    if config.width <= 0.0 || config.padding < 0.0 || 2.0 * config.padding >= config.width {
        return Err(ExportError::RenderMount(format!(
            "container geometry is degenerate: width={} padding={}",
            config.width, config.padding
        )));
    }

    log::debug!("mounting offscreen host at width {}", config.width);
    let nodes = dom::body_children(&dom::parse_markup(markup));
    let metrics = match &config.font {
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|e| {
                ExportError::RenderMount(format!("cannot read font '{}': {e}", path.display()))
            })?;
            TextMetrics::from_font_bytes(bytes)
                .map_err(|e| ExportError::RenderMount(format!("font '{}': {e}", path.display())))?
        }
        None => TextMetrics::heuristic(),
    };
    let surface = layout::lay_out(
        &nodes,
        config.width,
        config.padding,
        config.line_height,
        &metrics,
    );

    if !settle.is_zero() {
        std::thread::sleep(settle);
    }
    cancel.check()?;

    Ok(RenderHandle {
        surface,
        config: config.clone(),
        _slot: slot,
    })
}

/// Serializes tests that contend on the host slot. Test-only; the production
/// path relies on the busy rejection instead.
#[cfg(test)]
pub(crate) fn test_slot_guard() -> MutexGuard<'static, ()> {
    static TEST_LOCK: Mutex<()> = Mutex::new(());
    TEST_LOCK
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
