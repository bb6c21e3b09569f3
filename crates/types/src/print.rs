//! Print-production value types: paper, ink, page counts and cover geometry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Paper stock of the printed interior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaperType {
    #[default]
    White,
    Cream,
}

impl fmt::Display for PaperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Cream => write!(f, "cream"),
        }
    }
}

impl FromStr for PaperType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "white" => Ok(Self::White),
            "cream" => Ok(Self::Cream),
            other => Err(format!(
                "Unknown paper type '{}' (expected 'white' or 'cream')",
                other
            )),
        }
    }
}

/// Ink used for the printed interior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InkType {
    #[default]
    Bw,
    StandardColor,
    PremiumColor,
}

impl fmt::Display for InkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bw => write!(f, "bw"),
            Self::StandardColor => write!(f, "standard-color"),
            Self::PremiumColor => write!(f, "premium-color"),
        }
    }
}

impl FromStr for InkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bw" | "black-and-white" => Ok(Self::Bw),
            "standard-color" | "color" => Ok(Self::StandardColor),
            "premium-color" => Ok(Self::PremiumColor),
            other => Err(format!(
                "Unknown ink type '{}' (expected 'bw', 'standard-color' or 'premium-color')",
                other
            )),
        }
    }
}

/// Number of pages in a typeset interior.
///
/// Only the PDF typesetter produces this in a publish run; the cover
/// geometry is computed from it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageCount(u32);

impl PageCount {
    pub fn new(pages: u32) -> Self {
        Self(pages)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PageCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed physical parameters of the printed book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrintSpec {
    pub trim_width_in: f64,
    pub trim_height_in: f64,
    pub bleed_in: f64,
    pub cover_thickness_in: f64,
    pub dpi: u32,
}

impl PrintSpec {
    /// 6×9 inch paperback with 0.125 inch bleed at 300 DPI.
    pub const PAPERBACK_6X9: PrintSpec = PrintSpec {
        trim_width_in: 6.0,
        trim_height_in: 9.0,
        bleed_in: 0.125,
        cover_thickness_in: 0.0025,
        dpi: 300,
    };

    /// Convert inches to whole pixels at this spec's DPI.
    pub fn to_px(&self, inches: f64) -> u32 {
        (inches * self.dpi as f64).round() as u32
    }
}

impl Default for PrintSpec {
    fn default() -> Self {
        Self::PAPERBACK_6X9
    }
}

/// A horizontal band of the wrap-around cover, measured from its left edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub start_in: f64,
    pub end_in: f64,
    pub start_px: u32,
    pub end_px: u32,
}

impl Region {
    pub fn width_in(&self) -> f64 {
        self.end_in - self.start_in
    }

    pub fn width_px(&self) -> u32 {
        self.end_px - self.start_px
    }

    pub fn center_in(&self) -> f64 {
        (self.start_in + self.end_in) / 2.0
    }
}

/// Left-to-right layout of the wrap-around cover: back, spine, front.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverLayout {
    pub back_cover: Region,
    pub spine: Region,
    pub front_cover: Region,
}

/// Physical dimensions of a paperback wrap-around cover.
///
/// Derived from a page count on every run and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverDimensions {
    pub page_count: PageCount,
    pub paper: PaperType,
    pub ink: InkType,
    pub spec: PrintSpec,
    pub spine_width_in: f64,
    pub full_cover_width_in: f64,
    pub full_cover_height_in: f64,
    pub width_px: u32,
    pub height_px: u32,
    pub layout: CoverLayout,
}

impl CoverDimensions {
    /// Width of the cover in PDF points (72 per inch).
    pub fn width_pt(&self) -> f64 {
        self.full_cover_width_in * 72.0
    }

    /// Height of the cover in PDF points (72 per inch).
    pub fn height_pt(&self) -> f64 {
        self.full_cover_height_in * 72.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_and_ink_parse() {
        assert_eq!("White".parse::<PaperType>().unwrap(), PaperType::White);
        assert_eq!("cream".parse::<PaperType>().unwrap(), PaperType::Cream);
        assert!("glossy".parse::<PaperType>().is_err());

        assert_eq!("bw".parse::<InkType>().unwrap(), InkType::Bw);
        assert_eq!(
            "premium-color".parse::<InkType>().unwrap(),
            InkType::PremiumColor
        );
        assert!("neon".parse::<InkType>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for ink in [InkType::Bw, InkType::StandardColor, InkType::PremiumColor] {
            assert_eq!(ink.to_string().parse::<InkType>().unwrap(), ink);
        }
    }

    #[test]
    fn test_to_px() {
        let spec = PrintSpec::PAPERBACK_6X9;
        assert_eq!(spec.to_px(1.0), 300);
        assert_eq!(spec.to_px(9.25), 2775);
    }
}
