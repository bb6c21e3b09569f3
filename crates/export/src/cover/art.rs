//! Generated abstract front-cover art for projects without a cover image.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;

/// Paint a gradient with translucent circles, seeded from `title` so the same
/// title always yields the same art.
pub fn generate_cover_art(title: &str, width: u32, height: u32) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(title_seed(title));

    let top = random_color(&mut rng, 20..110);
    let bottom = random_color(&mut rng, 90..220);
    let mut canvas = RgbImage::from_fn(width, height, |_, y| {
        let t = if height > 1 {
            y as f32 / (height - 1) as f32
        } else {
            0.0
        };
        Rgb(std::array::from_fn(|i| lerp(top[i], bottom[i], t)))
    });

    let circles: u32 = rng.random_range(5..12);
    let span = width.max(height).max(1) as f32;
    for _ in 0..circles {
        let cx = rng.random_range(0.0f32..1.0) * width as f32;
        let cy = rng.random_range(0.0f32..1.0) * height as f32;
        let radius = rng.random_range(0.08f32..0.35) * span;
        let color = random_color(&mut rng, 60..255);
        let alpha = rng.random_range(0.12f32..0.35);
        blend_circle(&mut canvas, cx, cy, radius, color, alpha);
    }

    canvas
}

/// Encode an RGB image as PNG bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// FNV-1a over the title bytes.
fn title_seed(title: &str) -> u64 {
    title.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x0100_0000_01b3)
    })
}

fn random_color(rng: &mut StdRng, range: std::ops::Range<u8>) -> [u8; 3] {
    std::array::from_fn(|_| rng.random_range(range.clone()))
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

fn blend_circle(canvas: &mut RgbImage, cx: f32, cy: f32, radius: f32, color: [u8; 3], alpha: f32) {
    let (width, height) = canvas.dimensions();
    let x0 = (cx - radius).max(0.0) as u32;
    let y0 = (cy - radius).max(0.0) as u32;
    let x1 = ((cx + radius).ceil().max(0.0) as u32).min(width);
    let y1 = ((cy + radius).ceil().max(0.0) as u32).min(height);
    let radius_sq = radius * radius;

    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy <= radius_sq {
                let pixel = canvas.get_pixel_mut(x, y);
                for i in 0..3 {
                    pixel.0[i] = lerp(pixel.0[i], color[i], alpha);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_art_is_deterministic_per_title() {
        let a = generate_cover_art("The Salt Road", 60, 90);
        let b = generate_cover_art("The Salt Road", 60, 90);
        let c = generate_cover_art("Another Book", 60, 90);

        assert_eq!(a.dimensions(), (60, 90));
        assert_eq!(a.as_raw(), b.as_raw());
        assert_ne!(a.as_raw(), c.as_raw());
    }

    #[test]
    fn test_png_round_trip() {
        let art = generate_cover_art("Tides", 16, 24);
        let png = encode_png(&art).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.as_raw(), art.as_raw());
    }
}
