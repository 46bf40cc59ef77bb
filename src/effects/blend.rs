use image::{imageops, Pixel, Rgba, RgbaImage};

use crate::bitmap::{Bitmap, Color};

/// Composite `top` over a copy of `canvas` at (`x`, `y`) using the standard
/// "over" operator, with `top`'s own alpha as the blend weight.
///
/// Pixels of `top` outside the canvas are ignored. Over an opaque canvas the
/// result stays opaque and colours are `top * a + canvas * (1 - a)`.
pub fn paste_with_alpha(canvas: &Bitmap, top: &Bitmap, x: i64, y: i64) -> Bitmap {
    let mut out = canvas.clone();
    imageops::overlay(&mut out, top, x, y);
    for (dst, below) in out.pixels_mut().zip(canvas.pixels()) {
        keep_opaque(dst, below[3]);
    }
    out
}

/// Flatten `image` onto an opaque canvas of `background` colour.
pub fn flatten(image: &Bitmap, background: Color) -> Bitmap {
    let canvas = RgbaImage::from_pixel(image.width(), image.height(), background.to_rgba());
    paste_with_alpha(&canvas, image, 0, 0)
}

/// Blend a colour with partial `coverage` (0.0..=1.0) into a pixel.
pub fn blend_coverage(dst: &mut Rgba<u8>, color: Color, coverage: f32) {
    let a = (coverage.clamp(0.0, 1.0) * color.a as f32).round() as u8;
    let below = dst[3];
    dst.blend(&Rgba([color.r, color.g, color.b, a]));
    keep_opaque(dst, below);
}

// `Rgba::blend` works in f32 and can land an opaque destination on 254.
fn keep_opaque(pixel: &mut Rgba<u8>, alpha_below: u8) {
    if alpha_below == u8::MAX {
        pixel[3] = u8::MAX;
    }
}
