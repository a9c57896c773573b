//! PDF assembler – accumulates composited page rasters into one document and
//! finalizes it to bytes, using `printpdf`'s ops-based API.
//!
//! Pages are appended strictly in the order `add_page` is called, which the
//! pipeline guarantees equals band order. Every page image is anchored at
//! `(margin, margin)` from the page's top-left and scaled to fill the
//! printable width; the caller decides the placed height (stretch-to-fill
//! under equal-division slicing, natural aspect under fixed-capacity).

use std::io::Cursor;

use printpdf::*;

use crate::compositor::PageRaster;
use crate::error::ExportError;
use crate::slicer::PageGeometry;

const MM_TO_PT: f32 = 72.0 / 25.4;

/// Accumulates pages; append-only, finalized once.
pub struct PdfAssembler {
    doc: PdfDocument,
    pages: Vec<PdfPage>,
    geometry: PageGeometry,
}

impl PdfAssembler {
    pub fn new(title: &str, geometry: PageGeometry) -> Self {
        Self {
            doc: PdfDocument::new(title),
            pages: Vec::new(),
            geometry,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append one page carrying `page` placed at the margin anchor with the
    /// given height in mm. The image always spans the printable width.
    pub fn add_page(
        &mut self,
        page: &PageRaster,
        image_height_mm: f32,
    ) -> Result<(), ExportError> {
        if page.width() == 0 || page.height() == 0 {
            return Err(ExportError::Assembly(format!(
                "page raster {} is empty ({}x{})",
                self.pages.len(),
                page.width(),
                page.height()
            )));
        }

        let mut png = Vec::new();
        page.pixels
            .write_to(&mut Cursor::new(&mut png), ::image::ImageFormat::Png)
            .map_err(|e| ExportError::Assembly(format!("PNG encode failed: {e}")))?;

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let raw = RawImage::decode_from_bytes(&png, &mut warnings)
            .map_err(|e| ExportError::Assembly(format!("image registration failed: {e}")))?;
        let xobj_id = self.doc.add_image(&raw);

        let margin_pt = self.geometry.margin_mm * MM_TO_PT;
        let page_height_pt = self.geometry.page_height_mm * MM_TO_PT;
        let printable_width_pt = self.geometry.printable_width_mm() * MM_TO_PT;
        let image_height_pt = image_height_mm * MM_TO_PT;

        // PDF origin is bottom-left; the anchor is (margin, margin) from the
        // top-left, so translate_y is the image's bottom edge.
        let translate_y = page_height_pt - margin_pt - image_height_pt;

        // At dpi=72 printpdf renders 1 px = 1 pt, so scale = desired_pt / px.
        let ops = vec![Op::UseXobject {
            id: xobj_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(margin_pt)),
                translate_y: Some(Pt(translate_y)),
                dpi: Some(72.0),
                scale_x: Some(printable_width_pt / page.width() as f32),
                scale_y: Some(image_height_pt / page.height() as f32),
                rotate: None,
            },
        }];

        self.pages.push(PdfPage::new(
            Mm(self.geometry.page_width_mm),
            Mm(self.geometry.page_height_mm),
            ops,
        ));
        Ok(())
    }

    /// Finalize the document into PDF bytes. Refuses to emit an empty
    /// document – the pipeline must never offer a contentless file for save.
    pub fn finalize(mut self) -> Result<Vec<u8>, ExportError> {
        if self.pages.is_empty() {
            return Err(ExportError::Assembly("no pages were added".to_string()));
        }
        self.doc.with_pages(self.pages);
        let bytes = self.doc.save(&PdfSaveOptions::default(), &mut Vec::new());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white_page(width: u32, height: u32) -> PageRaster {
        PageRaster {
            pixels: ::image::RgbaImage::from_pixel(
                width,
                height,
                ::image::Rgba([255, 255, 255, 255]),
            ),
        }
    }

    #[test]
    fn single_page_document() {
        let mut asm = PdfAssembler::new("test", PageGeometry::a4());
        asm.add_page(&white_page(100, 140), 277.0).unwrap();
        assert_eq!(asm.page_count(), 1);
        let bytes = asm.finalize().unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn pages_accumulate_in_order() {
        let mut asm = PdfAssembler::new("test", PageGeometry::a4());
        for _ in 0..3 {
            asm.add_page(&white_page(50, 70), 277.0).unwrap();
        }
        assert_eq!(asm.page_count(), 3);
        assert!(asm.finalize().is_ok());
    }

    #[test]
    fn empty_document_is_refused() {
        let asm = PdfAssembler::new("test", PageGeometry::a4());
        assert!(matches!(
            asm.finalize(),
            Err(ExportError::Assembly(_))
        ));
    }

    #[test]
    fn empty_page_raster_is_refused() {
        let mut asm = PdfAssembler::new("test", PageGeometry::a4());
        assert!(matches!(
            asm.add_page(&white_page(0, 0), 277.0),
            Err(ExportError::Assembly(_))
        ));
    }
}
