use image::{GrayImage, Luma};
use tracing::debug;

use crate::{
    bitmap::{AlphaMask, Bitmap},
    effects::alpha,
};

/// Clamp a corner radius so that opposite corners never overlap.
pub fn clamp_radius(width: u32, height: u32, radius: u32) -> u32 {
    radius.min(width.min(height) / 2)
}

/// Build a filled rounded-rectangle mask covering the whole `width x height`
/// area: 255 inside, 0 in the cut-off corners.
///
/// Inside a corner square a pixel is kept when its centre lies within
/// `radius - 0.5` of the arc's centre, so even a radius of 1 removes the
/// extreme corner pixel. The edge is hard (no antialiasing). `radius` is
/// clamped with [`clamp_radius`].
pub fn mask(width: u32, height: u32, radius: u32) -> AlphaMask {
    let r = clamp_radius(width, height, radius) as f64;
    let (w, h) = (width as f64, height as f64);
    let reach = (r - 0.5).max(0.0);

    GrayImage::from_fn(width, height, |x, y| {
        let px = x as f64 + 0.5;
        let py = y as f64 + 0.5;

        let cx = if px < r {
            r
        } else if px > w - r {
            w - r
        } else {
            return Luma([255]);
        };
        let cy = if py < r {
            r
        } else if py > h - r {
            h - r
        } else {
            return Luma([255]);
        };

        let (dx, dy) = (px - cx, py - cy);
        if dx * dx + dy * dy <= reach * reach {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Round the corners of `image`.
///
/// The resulting alpha is `min(original alpha, mask)`: corners can only lose
/// opacity. Colour channels are copied unchanged. A zero radius returns an
/// exact copy.
pub fn apply(image: &Bitmap, radius: u32) -> Bitmap {
    if radius == 0 {
        return image.clone();
    }

    let (width, height) = image.dimensions();
    debug!(
        "Rounding {}x{} bitmap with radius {} (clamped {})",
        width,
        height,
        radius,
        clamp_radius(width, height, radius)
    );

    let corners = mask(width, height, radius);
    let combined = alpha::min(&alpha::extract(image), &corners);
    alpha::replace(image, &combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn opaque(width: u32, height: u32) -> Bitmap {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 9, 255]))
    }

    #[test]
    fn test_zero_radius_is_identity() {
        let image = RgbaImage::from_fn(8, 6, |x, y| Rgba([1, 2, 3, (x * 30 + y) as u8]));
        assert_eq!(apply(&image, 0), image);
    }

    #[test]
    fn test_corners_cleared_and_center_kept() {
        let out = apply(&opaque(40, 30), 10);
        for &(x, y) in &[(0, 0), (39, 0), (0, 29), (39, 29), (1, 1)] {
            assert_eq!(out.get_pixel(x, y)[3], 0, "corner ({}, {})", x, y);
        }
        assert_eq!(out.get_pixel(20, 15)[3], 255);
        assert_eq!(out.get_pixel(20, 0)[3], 255);
        assert_eq!(out.get_pixel(0, 15)[3], 255);
    }

    #[test]
    fn test_oversized_radius_is_clamped() {
        let out = apply(&opaque(20, 10), 1000);
        for &(x, y) in &[(0, 0), (19, 0), (0, 9), (19, 9)] {
            assert_eq!(out.get_pixel(x, y)[3], 0);
        }
        // The middle column still spans the full height.
        assert_eq!(out.get_pixel(10, 0)[3], 255);
        assert_eq!(out.get_pixel(10, 9)[3], 255);
    }

    #[test]
    fn test_tiny_images_lose_all_four_corners() {
        for &(width, height) in &[(2, 2), (3, 3), (2, 10), (10, 2)] {
            let out = apply(&opaque(width, height), 1000);
            for &(x, y) in &[(0, 0), (width - 1, 0), (0, height - 1), (width - 1, height - 1)] {
                assert_eq!(out.get_pixel(x, y)[3], 0, "{}x{} corner ({}, {})", width, height, x, y);
            }
        }

        let out = apply(&opaque(3, 3), 1000);
        assert_eq!(out.get_pixel(1, 1)[3], 255);
        assert_eq!(out.get_pixel(1, 0)[3], 255);
        let out = apply(&opaque(2, 10), 1000);
        assert_eq!(out.get_pixel(0, 5)[3], 255);
    }

    #[test]
    fn test_radius_one_cuts_single_corner_pixel() {
        let m = mask(8, 8, 1);
        let cleared: Vec<_> = m.enumerate_pixels().filter(|(_, _, v)| v[0] == 0).map(|(x, y, _)| (x, y)).collect();
        assert_eq!(cleared, vec![(0, 0), (7, 0), (0, 7), (7, 7)]);
    }

    #[test]
    fn test_mask_never_adds_opacity() {
        let image = RgbaImage::from_pixel(20, 20, Rgba([5, 5, 5, 40]));
        let out = apply(&image, 5);
        assert!(out.pixels().all(|p| p[3] == 40 || p[3] == 0));
        assert!(out.pixels().zip(image.pixels()).all(|(a, b)| a.0[..3] == b.0[..3]));
    }

    #[test]
    fn test_mask_is_symmetric() {
        let m = mask(21, 13, 6);
        for y in 0..13 {
            for x in 0..21 {
                assert_eq!(m.get_pixel(x, y), m.get_pixel(20 - x, y));
                assert_eq!(m.get_pixel(x, y), m.get_pixel(x, 12 - y));
            }
        }
    }
}
