use image::{Rgba, RgbaImage};

use crate::bitmap::{Bitmap, Color};

/// Fill a bitmap with a vertical gradient from `start` (top row) to `end`
/// (bottom row).
///
/// The interpolation factor is `row / (height - 1)` and does not depend on
/// the column. Channels are truncated towards zero and alpha is always 255.
/// A single-row bitmap takes the start colour.
pub fn fill(size: (u32, u32), start: Color, end: Color) -> Bitmap {
    let (width, height) = size;
    let span = height.saturating_sub(1);

    let rows: Vec<Rgba<u8>> = (0..height)
        .map(|y| {
            let t = if span == 0 { 0.0 } else { y as f64 / span as f64 };
            Rgba([
                lerp(start.r, end.r, t),
                lerp(start.g, end.g, t),
                lerp(start.b, end.b, t),
                255,
            ])
        })
        .collect();

    RgbaImage::from_fn(width, height, |_, y| rows[y as usize])
}

fn lerp(from: u8, to: u8, t: f64) -> u8 {
    (from as f64 + (to as f64 - from as f64) * t) as u8
}
