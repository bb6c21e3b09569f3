//! Paperback cover geometry, art and rendering.

pub mod art;
pub mod dimensions;
pub mod render;

pub use art::{encode_png, generate_cover_art};
pub use dimensions::{
    MAX_PAGE_COUNT, MIN_PAGE_COUNT, compute_dimensions, compute_dimensions_with_spec,
    per_page_thickness_in,
};
pub use render::{
    CoverOptions, RenderedCover, SPINE_LETTERING_MIN_PAGES, parse_hex_color, render_cover,
};
