//! Paperback wrap-around cover rendering.
//!
//! Backgrounds and images are composited onto one raster at print
//! resolution; blurb and spine lettering are drawn as PDF text over it so
//! they stay sharp. The page is sized to the calculated cover exactly.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use lopdf::content::Operation;
use lopdf::{Dictionary, Object, dictionary};
use quire_types::{BookMetadata, CoverDimensions};
use tracing::{debug, info};

use crate::error::{ExportError, Result};
use crate::markup::split_paragraphs;
use crate::typeset::document::{PdfBuilder, fill_rgb, stroke_rgb, text_line, text_string};
use crate::typeset::{StandardFont, wrap_text};

/// Spines of shorter books are left blank.
pub const SPINE_LETTERING_MIN_PAGES: u32 = 100;
/// Spine font size as a fraction of the spine width.
pub const SPINE_FONT_RATIO: f32 = 0.55;
/// Largest spine font size, in points.
pub const MAX_SPINE_FONT_SIZE: f32 = 14.0;

/// Distance kept between cover text and the trim edge, in inches.
const SAFE_MARGIN_IN: f64 = 0.5;
/// Edge of the author photo on the back cover, in inches.
const PHOTO_SIZE_IN: f64 = 1.4;
const BLURB_SIZE: f32 = 11.0;
const BLURB_LINE_HEIGHT: f32 = 15.0;

const GUIDE_TRIM: [u8; 3] = [220, 30, 30];
const GUIDE_SAFE: [u8; 3] = [0, 150, 220];

/// What to draw on the cover besides the front image.
#[derive(Debug, Clone)]
pub struct CoverOptions {
    pub title: String,
    pub author: String,
    pub blurb: Option<String>,
    /// Encoded image (PNG/JPEG) placed on the back cover.
    pub author_photo: Option<Vec<u8>>,
    pub back_color: [u8; 3],
    pub spine_color: [u8; 3],
    /// Draw trim, spine and safe-area guides. Proofs only.
    pub guides: bool,
}

impl CoverOptions {
    pub const DEFAULT_BACK_COLOR: [u8; 3] = [0x1f, 0x2a, 0x44];
    pub const DEFAULT_SPINE_COLOR: [u8; 3] = [0x15, 0x1d, 0x30];

    /// Options carrying the book's title, author and blurb.
    pub fn for_book(metadata: &BookMetadata) -> Self {
        Self {
            title: metadata.title.clone(),
            author: metadata.author.clone(),
            blurb: metadata.blurb.clone(),
            author_photo: None,
            back_color: Self::DEFAULT_BACK_COLOR,
            spine_color: Self::DEFAULT_SPINE_COLOR,
            guides: false,
        }
    }

    pub fn with_author_photo(mut self, photo: Vec<u8>) -> Self {
        self.author_photo = Some(photo);
        self
    }

    pub fn with_colors(mut self, back: [u8; 3], spine: [u8; 3]) -> Self {
        self.back_color = back;
        self.spine_color = spine;
        self
    }

    pub fn with_guides(mut self, guides: bool) -> Self {
        self.guides = guides;
        self
    }
}

/// A rendered cover PDF.
#[derive(Debug, Clone)]
pub struct RenderedCover {
    pub bytes: Vec<u8>,
    /// Whether title and author were drawn on the spine.
    pub spine_lettered: bool,
}

/// Parse `#rrggbb` or `rrggbb`.
pub fn parse_hex_color(value: &str) -> Result<[u8; 3]> {
    let hex = value.trim().trim_start_matches('#');
    let invalid = || ExportError::InvalidConfiguration {
        message: format!(
            "'{}' is not a hex color. Use six hex digits such as #1f2a44",
            value
        ),
    };
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// Render the wrap-around cover for `dims` with `front_image` (PNG/JPEG
/// bytes) filling the front panel.
pub fn render_cover(
    dims: &CoverDimensions,
    front_image: &[u8],
    options: &CoverOptions,
) -> Result<RenderedCover> {
    let canvas = compose_raster(dims, front_image, options)?;

    let width_pt = dims.width_pt() as f32;
    let height_pt = dims.height_pt() as f32;
    let bleed_pt = (dims.spec.bleed_in * 72.0) as f32;

    let mut builder = PdfBuilder::new();
    let image_id = builder.add_rgb_image(canvas.width(), canvas.height(), canvas.as_raw())?;
    drop(canvas);

    let mut operations = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                width_pt.into(),
                0.into(),
                0.into(),
                height_pt.into(),
                0.into(),
                0.into(),
            ],
        ),
        Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]),
        Operation::new("Q", vec![]),
    ];

    operations.extend(blurb_operations(dims, options));

    let spine_lettered = dims.page_count.get() >= SPINE_LETTERING_MIN_PAGES;
    if spine_lettered {
        operations.extend(spine_operations(dims, options));
    } else {
        info!(
            "Spine too narrow for lettering ({} pages, needs {}); leaving it blank",
            dims.page_count, SPINE_LETTERING_MIN_PAGES
        );
    }

    if options.guides {
        operations.extend(guide_operations(dims));
    }

    let trim_box: Vec<Object> = vec![
        bleed_pt.into(),
        bleed_pt.into(),
        (width_pt - bleed_pt).into(),
        (height_pt - bleed_pt).into(),
    ];
    let bleed_box: Vec<Object> = vec![0.into(), 0.into(), width_pt.into(), height_pt.into()];
    let page_extra = dictionary! {
        "TrimBox" => trim_box,
        "BleedBox" => bleed_box,
    };

    builder.add_page(
        (width_pt, height_pt),
        operations,
        Some(dictionary! { "Im1" => image_id }),
        Some(page_extra),
    )?;

    let info = dictionary! {
        "Title" => text_string(&format!("{} (paperback cover)", options.title)),
        "Author" => text_string(&options.author),
        "Producer" => text_string(concat!("quire ", env!("CARGO_PKG_VERSION"))),
    };
    let bytes = builder.finish(Dictionary::new(), info)?;

    debug!(
        "Rendered {}x{} px cover ({:.3} x {:.3} in, {} bytes)",
        dims.width_px,
        dims.height_px,
        dims.full_cover_width_in,
        dims.full_cover_height_in,
        bytes.len()
    );

    Ok(RenderedCover {
        bytes,
        spine_lettered,
    })
}

/// Backgrounds, front image and author photo at print resolution.
fn compose_raster(
    dims: &CoverDimensions,
    front_image: &[u8],
    options: &CoverOptions,
) -> Result<RgbImage> {
    let layout = &dims.layout;
    let mut canvas = RgbImage::from_fn(dims.width_px, dims.height_px, |x, _| {
        if x < layout.spine.start_px {
            Rgb(options.back_color)
        } else {
            Rgb(options.spine_color)
        }
    });

    let front_width = layout.front_cover.width_px();
    let front = image::load_from_memory(front_image)?
        .resize_to_fill(front_width, dims.height_px, FilterType::CatmullRom)
        .to_rgb8();
    imageops::overlay(&mut canvas, &front, layout.front_cover.start_px as i64, 0);

    if let Some(photo) = &options.author_photo {
        let spec = &dims.spec;
        let size = spec.to_px(PHOTO_SIZE_IN);
        let photo = image::load_from_memory(photo)?
            .resize_to_fill(size, size, FilterType::CatmullRom)
            .to_rgb8();
        let x = spec.to_px(spec.bleed_in + SAFE_MARGIN_IN);
        let y = dims
            .height_px
            .saturating_sub(spec.to_px(spec.bleed_in + SAFE_MARGIN_IN) + size);
        imageops::overlay(&mut canvas, &photo, x as i64, y as i64);
    }

    Ok(canvas)
}

/// Wrapped blurb paragraphs at the top of the back cover.
fn blurb_operations(dims: &CoverDimensions, options: &CoverOptions) -> Vec<Operation> {
    let Some(blurb) = options.blurb.as_deref().filter(|b| !b.trim().is_empty()) else {
        return Vec::new();
    };

    let spec = &dims.spec;
    let left = ((spec.bleed_in + SAFE_MARGIN_IN) * 72.0) as f32;
    let right = ((dims.layout.spine.start_in - SAFE_MARGIN_IN) * 72.0) as f32;
    let width = right - left;
    let mut floor = ((spec.bleed_in + SAFE_MARGIN_IN) * 72.0) as f32;
    if options.author_photo.is_some() {
        floor += ((PHOTO_SIZE_IN + 0.25) * 72.0) as f32;
    }

    let mut y = (dims.height_pt() - (spec.bleed_in + SAFE_MARGIN_IN) * 72.0) as f32;
    let mut operations = vec![fill_rgb(contrasting(options.back_color))];
    'paragraphs: for paragraph in split_paragraphs(blurb) {
        for line in wrap_text(&paragraph, StandardFont::TimesRoman, BLURB_SIZE, width, width) {
            y -= BLURB_LINE_HEIGHT;
            if y < floor {
                debug!("Blurb truncated to fit the back cover");
                break 'paragraphs;
            }
            operations.extend(text_line(
                StandardFont::TimesRoman,
                BLURB_SIZE,
                left,
                y,
                &line,
                0.0,
            ));
        }
        y -= BLURB_LINE_HEIGHT / 2.0;
    }
    operations
}

/// Spine font size for a spine of `spine_width_pt`.
pub fn spine_font_size(spine_width_pt: f32) -> f32 {
    (spine_width_pt * SPINE_FONT_RATIO).min(MAX_SPINE_FONT_SIZE)
}

/// Title from the top and author from the bottom, rotated to read top to
/// bottom.
fn spine_operations(dims: &CoverDimensions, options: &CoverOptions) -> Vec<Operation> {
    let spec = &dims.spec;
    let spine = &dims.layout.spine;
    let mut size = spine_font_size((spine.width_in() * 72.0) as f32);

    let margin = ((spec.bleed_in + SAFE_MARGIN_IN) * 72.0) as f32;
    let gap = (0.25 * 72.0) as f32;
    let available = dims.height_pt() as f32 - 2.0 * margin;

    let title_width = StandardFont::TimesBold.text_width(&options.title, size);
    let author_width = StandardFont::TimesRoman.text_width(&options.author, size);
    let needed = title_width + gap + author_width;
    if needed > available {
        size *= available / needed;
        debug!("Spine lettering reduced to {:.1} pt to fit", size);
    }

    let baseline_x = (spine.center_in() * 72.0) as f32 - 0.35 * size;
    let title_y = dims.height_pt() as f32 - margin;
    let author_y = margin + StandardFont::TimesRoman.text_width(&options.author, size);

    let mut operations = vec![fill_rgb(contrasting(options.spine_color))];
    operations.extend(rotated_text(
        StandardFont::TimesBold,
        size,
        baseline_x,
        title_y,
        &options.title,
    ));
    operations.extend(rotated_text(
        StandardFont::TimesRoman,
        size,
        baseline_x,
        author_y,
        &options.author,
    ));
    operations
}

fn rotated_text(font: StandardFont, size: f32, x: f32, y: f32, text: &str) -> Vec<Operation> {
    let mut operations = text_line(font, size, 0.0, 0.0, text, 0.0);
    // swap the Td positioning for a rotating text matrix
    for operation in operations.iter_mut() {
        if operation.operator == "Td" {
            *operation = Operation::new(
                "Tm",
                vec![
                    0.into(),
                    (-1).into(),
                    1.into(),
                    0.into(),
                    x.into(),
                    y.into(),
                ],
            );
        }
    }
    operations
}

/// Dashed trim, spine and safe-area lines.
fn guide_operations(dims: &CoverDimensions) -> Vec<Operation> {
    let spec = &dims.spec;
    let to_pt = |inches: f64| (inches * 72.0) as f32;
    let width = dims.width_pt() as f32;
    let height = dims.height_pt() as f32;
    let bleed = to_pt(spec.bleed_in);
    let safe = to_pt(spec.bleed_in + SAFE_MARGIN_IN);
    let spine_start = to_pt(dims.layout.spine.start_in);
    let spine_end = to_pt(dims.layout.spine.end_in);

    let rect = |x: f32, y: f32, w: f32, h: f32| {
        vec![
            Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()]),
            Operation::new("S", vec![]),
        ]
    };
    let line = |x: f32| {
        vec![
            Operation::new("m", vec![x.into(), 0.into()]),
            Operation::new("l", vec![x.into(), height.into()]),
            Operation::new("S", vec![]),
        ]
    };

    let mut operations = vec![
        Operation::new("q", vec![]),
        Operation::new("w", vec![0.75f32.into()]),
        Operation::new(
            "d",
            vec![Object::Array(vec![4.into(), 3.into()]), 0.into()],
        ),
        stroke_rgb(GUIDE_TRIM),
    ];
    operations.extend(rect(bleed, bleed, width - 2.0 * bleed, height - 2.0 * bleed));
    operations.extend(line(spine_start));
    operations.extend(line(spine_end));

    operations.push(stroke_rgb(GUIDE_SAFE));
    operations.extend(rect(safe, safe, spine_start - safe - to_pt(SAFE_MARGIN_IN), height - 2.0 * safe));
    let front_left = spine_end + to_pt(SAFE_MARGIN_IN);
    operations.extend(rect(front_left, safe, width - safe - front_left, height - 2.0 * safe));
    operations.push(Operation::new("Q", vec![]));
    operations
}

/// Black or white, whichever reads better on `background`.
fn contrasting(background: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = background.map(|c| c as f32);
    let luminance = 0.299 * r + 0.587 * g + 0.114 * b;
    if luminance > 140.0 {
        [0x11, 0x11, 0x11]
    } else {
        [0xf5, 0xf5, 0xf0]
    }
}
