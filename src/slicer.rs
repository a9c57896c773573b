//! Pagination slicer – computes how many pages the master raster needs and
//! which pixel band of it belongs to each page.
//!
//! The content is always scaled to fill the printable width, so the raster's
//! physical height follows from its aspect ratio alone. Two band policies
//! exist:
//!
//! - [`BandPolicy::EqualDivision`] divides the raster into `page_count` equal
//!   bands. This matches the upstream editor's observed behavior; when the
//!   physical height is not an exact multiple of the printable height, each
//!   band holds less than one page's worth and the placement stretch absorbs
//!   the difference.
//! - [`BandPolicy::FixedCapacity`] sizes every band to exactly one printable
//!   page of content, with a shorter final band. Pages keep their natural
//!   aspect; the last page ends where the content ends.
//!
//! Whichever policy runs, the bands exactly cover `[0, height)` with no gaps
//! and no overlaps, and the band order is the page order.

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Physical page constants, fixed for the whole export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    /// Margin on all four sides.
    pub margin_mm: f32,
}

impl PageGeometry {
    /// A4 with 10 mm margins – the export default.
    pub fn a4() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 10.0,
        }
    }

    pub fn printable_width_mm(&self) -> f32 {
        self.page_width_mm - 2.0 * self.margin_mm
    }

    pub fn printable_height_mm(&self) -> f32 {
        self.page_height_mm - 2.0 * self.margin_mm
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// How the master raster is divided into per-page bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BandPolicy {
    /// `page_count` equal-height bands (upstream-faithful default).
    #[default]
    EqualDivision,
    /// One printable page of content per band, shorter final band.
    FixedCapacity,
}

/// A `(source_y, source_height)` slice of the master raster. Band `index`
/// becomes page `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBand {
    pub index: usize,
    pub source_y: u32,
    pub source_height: u32,
}

/// Compute the ordered band plan for a raster of the given pixel dimensions.
///
/// `page_count = ceil(img_height_mm / printable_height_mm)`, minimum 1, with
/// no upper bound – arbitrarily long content produces arbitrarily many pages.
pub fn plan(
    raster_width: u32,
    raster_height: u32,
    geometry: &PageGeometry,
    policy: BandPolicy,
) -> Result<Vec<PageBand>, ExportError> {
    if raster_width == 0 {
        return Err(ExportError::SliceComputation(
            "raster width is zero".to_string(),
        ));
    }
    let printable_w = geometry.printable_width_mm();
    let printable_h = geometry.printable_height_mm();
    if printable_w <= 0.0 || printable_h <= 0.0 {
        return Err(ExportError::SliceComputation(format!(
            "margins leave no printable area on a {}x{} mm page",
            geometry.page_width_mm, geometry.page_height_mm
        )));
    }

    // Aspect-preserving map from pixel space to physical space: the image is
    // always scaled to fill the printable width.
    let img_height_mm = raster_height as f64 * printable_w as f64 / raster_width as f64;
    let page_count = ((img_height_mm / printable_h as f64).ceil() as usize).max(1);

    let boundaries: Vec<u32> = match policy {
        BandPolicy::EqualDivision => (0..=page_count)
            .map(|i| (i as u64 * raster_height as u64 / page_count as u64) as u32)
            .collect(),
        BandPolicy::FixedCapacity => {
            // Pixels that correspond to one printable page of content.
            // Boundaries are floored, never rounded up: a raster one pixel
            // past a whole number of pages must yield a one-pixel final band,
            // not an empty one.
            let px_per_page =
                raster_width as f64 * printable_h as f64 / printable_w as f64;
            let mut b: Vec<u32> = (0..=page_count)
                .map(|i| ((i as f64 * px_per_page).floor() as u64).min(raster_height as u64) as u32)
                .collect();
            b[page_count] = raster_height;
            for i in 1..=page_count {
                b[i] = b[i].max(b[i - 1]);
            }
            b
        }
    };

    // Collapsed boundaries would mean an empty band, which downstream stages
    // rightly refuse; skip them and renumber so band index == page index.
    let bands: Vec<PageBand> = (0..page_count)
        .filter(|&i| boundaries[i + 1] > boundaries[i])
        .enumerate()
        .map(|(index, i)| PageBand {
            index,
            source_y: boundaries[i],
            source_height: boundaries[i + 1] - boundaries[i],
        })
        .collect();

    log::debug!(
        "planned {} page(s) for {raster_width}x{raster_height} px \
         ({img_height_mm:.1} mm of content, {printable_h} mm printable)",
        bands.len()
    );
    Ok(bands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(bands: &[PageBand], height: u32) {
        let mut expected_y = 0u32;
        for (i, band) in bands.iter().enumerate() {
            assert_eq!(band.index, i);
            assert_eq!(band.source_y, expected_y, "gap or overlap before band {i}");
            expected_y += band.source_height;
        }
        assert_eq!(expected_y, height, "bands do not cover the raster");
    }

    #[test]
    fn reference_scenario_four_equal_bands() {
        // 800x4000 px on A4/10mm: 950 mm of content over 277 mm pages.
        let bands = plan(800, 4000, &PageGeometry::a4(), BandPolicy::EqualDivision).unwrap();
        assert_eq!(bands.len(), 4);
        for band in &bands {
            assert_eq!(band.source_height, 1000);
        }
        assert_exact_cover(&bands, 4000);
    }

    #[test]
    fn exact_multiple_gives_equal_bands_under_both_policies() {
        // printable 200x250 mm; 3000 px at 800 wide = 750 mm = exactly 3 pages.
        let geometry = PageGeometry {
            page_width_mm: 220.0,
            page_height_mm: 270.0,
            margin_mm: 10.0,
        };
        for policy in [BandPolicy::EqualDivision, BandPolicy::FixedCapacity] {
            let bands = plan(800, 3000, &geometry, policy).unwrap();
            assert_eq!(bands.len(), 3, "{policy:?}");
            assert!(bands.iter().all(|b| b.source_height == 1000), "{policy:?}");
            assert_exact_cover(&bands, 3000);
        }
    }

    #[test]
    fn page_count_is_ceiling_of_physical_height() {
        let geometry = PageGeometry::a4();
        for height in [1u32, 500, 1167, 1168, 2500, 9999] {
            let bands = plan(800, height, &geometry, BandPolicy::EqualDivision).unwrap();
            let img_height_mm = height as f64 * 190.0 / 800.0;
            let expected = (img_height_mm / 277.0).ceil().max(1.0) as usize;
            assert_eq!(bands.len(), expected, "height {height}");
            assert_exact_cover(&bands, height);
        }
    }

    #[test]
    fn single_short_page() {
        let bands = plan(800, 100, &PageGeometry::a4(), BandPolicy::EqualDivision).unwrap();
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].source_y, 0);
        assert_eq!(bands[0].source_height, 100);
    }

    #[test]
    fn fixed_capacity_final_band_is_shorter() {
        // 950 mm of content on 277 mm pages: three full bands, one remainder.
        let bands = plan(800, 4000, &PageGeometry::a4(), BandPolicy::FixedCapacity).unwrap();
        assert_eq!(bands.len(), 4);
        // One page of content is 800*277/190 ≈ 1166.3 px.
        assert_eq!(bands[0].source_height, 1166);
        assert!(bands[3].source_height < bands[0].source_height);
        assert_exact_cover(&bands, 4000);
    }

    #[test]
    fn fixed_capacity_one_pixel_past_a_page_boundary() {
        // 3498 px is exactly 3 pages of content (800*277/190 ≈ 1166.3 px per
        // page); one more pixel must open a fourth, one-pixel band rather
        // than an empty one.
        let bands = plan(800, 3499, &PageGeometry::a4(), BandPolicy::FixedCapacity).unwrap();
        assert_eq!(bands.len(), 4);
        assert!(
            bands.iter().all(|b| b.source_height > 0),
            "empty band in {bands:?}"
        );
        assert_eq!(bands[3].source_height, 1);
        assert_exact_cover(&bands, 3499);
    }

    #[test]
    fn fixed_capacity_bands_are_never_empty() {
        let geometry = PageGeometry::a4();
        for height in [1u32, 1166, 1167, 3498, 3499, 3500, 4000, 50_000] {
            let bands = plan(800, height, &geometry, BandPolicy::FixedCapacity).unwrap();
            assert!(
                bands.iter().all(|b| b.source_height > 0),
                "empty band at height {height}: {bands:?}"
            );
            assert_exact_cover(&bands, height);
        }
    }

    #[test]
    fn equal_division_covers_non_divisible_heights() {
        for height in [4001u32, 4003, 777, 3999] {
            let bands = plan(800, height, &PageGeometry::a4(), BandPolicy::EqualDivision).unwrap();
            assert_exact_cover(&bands, height);
        }
    }

    #[test]
    fn zero_width_is_a_slice_error() {
        match plan(0, 1000, &PageGeometry::a4(), BandPolicy::EqualDivision) {
            Err(ExportError::SliceComputation(_)) => {}
            other => panic!("expected SliceComputation, got {other:?}"),
        }
    }

    #[test]
    fn margins_swallowing_the_page_are_rejected() {
        let geometry = PageGeometry {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 150.0,
        };
        assert!(matches!(
            plan(800, 1000, &geometry, BandPolicy::EqualDivision),
            Err(ExportError::SliceComputation(_))
        ));
    }
}
