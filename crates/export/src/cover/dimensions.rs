//! Wrap-around cover geometry from a page count.

use quire_types::{
    CoverDimensions, CoverLayout, InkType, PageCount, PaperType, PrintSpec, Region,
};

use crate::error::{ExportError, Result};

/// Fewest pages the print vendor will bind.
pub const MIN_PAGE_COUNT: u32 = 24;
/// Most pages the print vendor will bind.
pub const MAX_PAGE_COUNT: u32 = 828;

/// Thickness of one interior page, in inches.
pub fn per_page_thickness_in(paper: PaperType, ink: InkType) -> Result<f64> {
    match (paper, ink) {
        (PaperType::White, InkType::Bw) => Ok(0.002237),
        (PaperType::Cream, InkType::Bw) => Ok(0.0025),
        (PaperType::White, InkType::StandardColor) => Ok(0.002252),
        (PaperType::White, InkType::PremiumColor) => Ok(0.002347),
        (PaperType::Cream, _) => Err(ExportError::UnsupportedPaperInk {
            paper: paper.to_string(),
            ink: ink.to_string(),
        }),
    }
}

/// Cover dimensions for the default 6×9 paperback.
pub fn compute_dimensions(
    page_count: PageCount,
    paper: PaperType,
    ink: InkType,
) -> Result<CoverDimensions> {
    compute_dimensions_with_spec(page_count, paper, ink, &PrintSpec::PAPERBACK_6X9)
}

/// Cover dimensions for an arbitrary print spec.
///
/// Regions tile the full width left to right: back cover (with the left
/// bleed), spine, front cover (with the right bleed).
pub fn compute_dimensions_with_spec(
    page_count: PageCount,
    paper: PaperType,
    ink: InkType,
    spec: &PrintSpec,
) -> Result<CoverDimensions> {
    let pages = page_count.get();
    if !(MIN_PAGE_COUNT..=MAX_PAGE_COUNT).contains(&pages) {
        return Err(ExportError::PageCountOutOfRange {
            page_count: pages,
            min: MIN_PAGE_COUNT,
            max: MAX_PAGE_COUNT,
        });
    }

    let spine_width_in = pages as f64 * per_page_thickness_in(paper, ink)? + spec.cover_thickness_in;
    let full_cover_width_in =
        2.0 * spec.trim_width_in + spine_width_in + 2.0 * spec.bleed_in;
    let full_cover_height_in = spec.trim_height_in + 2.0 * spec.bleed_in;

    let spine_start = spec.bleed_in + spec.trim_width_in;
    let spine_end = spine_start + spine_width_in;
    let region = |start_in: f64, end_in: f64| Region {
        start_in,
        end_in,
        start_px: spec.to_px(start_in),
        end_px: spec.to_px(end_in),
    };

    Ok(CoverDimensions {
        page_count,
        paper,
        ink,
        spec: *spec,
        spine_width_in,
        full_cover_width_in,
        full_cover_height_in,
        width_px: spec.to_px(full_cover_width_in),
        height_px: spec.to_px(full_cover_height_in),
        layout: CoverLayout {
            back_cover: region(0.0, spine_start),
            spine: region(spine_start, spine_end),
            front_cover: region(spine_end, full_cover_width_in),
        },
    })
}
