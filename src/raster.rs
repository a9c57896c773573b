//! Rasterizer – captures the mounted offscreen surface into one master
//! raster covering the entire document height.
//!
//! The master raster is produced once per export at a fixed oversampling
//! scale and is the immutable source of every page band. A surface that
//! measured zero height fails here with [`ExportError::Rasterization`] so the
//! caller sees the problem instead of an empty PDF.

use image::{imageops, Rgba, RgbaImage};

use crate::error::ExportError;
use crate::host::RenderHandle;
use crate::layout::PaintItem;

/// The master raster: a width × total-height pixel grid at the oversampling
/// scale times the logical surface size.
pub struct Raster {
    pub pixels: RgbaImage,
}

impl Raster {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Capture the mounted surface at `scale`× into a [`Raster`].
pub fn rasterize(handle: &RenderHandle, scale: f32) -> Result<Raster, ExportError> {
    if !(scale > 0.0) {
        return Err(ExportError::Rasterization(format!(
            "scale must be positive, got {scale}"
        )));
    }

    let surface = &handle.surface;
    let width = (surface.width * scale).round() as u32;
    let height = (surface.height * scale).round() as u32;
    if height == 0 || width == 0 {
        return Err(ExportError::Rasterization(format!(
            "surface measured {width}x{height} px; nothing to capture"
        )));
    }

    log::debug!("rasterizing {width}x{height} at scale {scale}");
    let bg = handle.config.background;
    let fg = handle.config.foreground;
    let mut pixels = RgbaImage::from_pixel(width, height, Rgba([bg[0], bg[1], bg[2], 255]));

    for item in &surface.items {
        match item {
            PaintItem::Box {
                x,
                y,
                width: w,
                height: h,
            } => {
                fill_rect(
                    &mut pixels,
                    (x * scale).round() as i64,
                    (y * scale).round() as i64,
                    (w * scale).round().max(1.0) as u32,
                    (h * scale).round().max(1.0) as u32,
                    Rgba([fg[0], fg[1], fg[2], 255]),
                );
            }
            PaintItem::Image {
                x,
                y,
                width: w,
                height: h,
                pixels: img,
            } => {
                let dst_w = (w * scale).round().max(1.0) as u32;
                let dst_h = (h * scale).round().max(1.0) as u32;
                let scaled = if (dst_w, dst_h) == img.dimensions() {
                    img.clone()
                } else {
                    imageops::resize(img, dst_w, dst_h, imageops::FilterType::Triangle)
                };
                imageops::overlay(
                    &mut pixels,
                    &scaled,
                    (x * scale).round() as i64,
                    (y * scale).round() as i64,
                );
            }
        }
    }

    Ok(Raster { pixels })
}

/// Fill an axis-aligned rectangle, clipped to the raster bounds.
fn fill_rect(img: &mut RgbaImage, x: i64, y: i64, w: u32, h: u32, color: Rgba<u8>) {
    let (iw, ih) = (img.width() as i64, img.height() as i64);
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w as i64).min(iw);
    let y1 = (y + h as i64).min(ih);
    for py in y0..y1 {
        for px in x0..x1 {
            img.put_pixel(px as u32, py as u32, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{self, test_slot_guard, HostConfig};
    use crate::pipeline::CancelToken;
    use std::time::Duration;

    fn mounted(markup: &str) -> host::RenderHandle {
        host::mount(
            markup,
            &HostConfig::default(),
            Duration::ZERO,
            &CancelToken::new(),
        )
        .unwrap()
    }

    #[test]
    fn empty_surface_fails_rasterization() {
        let _serial = test_slot_guard();
        let handle = mounted("");
        match rasterize(&handle, 2.0) {
            Err(ExportError::Rasterization(msg)) => {
                // The message names the dimension that actually collapsed.
                assert!(msg.contains("1600x0"), "unexpected message: {msg}");
            }
            Err(other) => panic!("expected Rasterization error, got {other:?}"),
            Ok(_) => panic!("expected Rasterization error, got a raster"),
        }
    }

    #[test]
    fn raster_dimensions_scale_with_factor() {
        let _serial = test_slot_guard();
        let handle = mounted("<p>hello raster</p>");
        let r1 = rasterize(&handle, 1.0).unwrap();
        let r2 = rasterize(&handle, 2.0).unwrap();
        assert_eq!(r1.width(), 800);
        assert_eq!(r2.width(), 1600);
        assert_eq!(r2.height(), r1.height() * 2);
    }

    #[test]
    fn painted_pixels_differ_from_background() {
        let _serial = test_slot_guard();
        let handle = mounted("<p>ink</p>");
        let raster = rasterize(&handle, 2.0).unwrap();
        let has_ink = raster
            .pixels
            .pixels()
            .any(|p| p.0 != [255, 255, 255, 255]);
        assert!(has_ink, "expected at least one foreground pixel");
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        let _serial = test_slot_guard();
        let handle = mounted("<p>x</p>");
        assert!(matches!(
            rasterize(&handle, 0.0),
            Err(ExportError::Rasterization(_))
        ));
    }
}
