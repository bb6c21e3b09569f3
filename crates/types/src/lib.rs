//! Shared value types for the quire publishing pipeline.
//!
//! Every renderer consumes the same [`Chapter`] list produced by a single
//! segmentation call, so the chapter id is the key that links HTML anchors,
//! EPUB manifest items and PDF destinations together.

pub mod chapter;
pub mod metadata;
pub mod print;

pub use chapter::{Chapter, ChapterId};
pub use metadata::BookMetadata;
pub use print::{
    CoverDimensions, CoverLayout, InkType, PageCount, PaperType, PrintSpec, Region,
};
