use image::{imageops, GrayImage, Luma, Rgba, RgbaImage};

use crate::bitmap::{AlphaMask, Bitmap};

/// Copy the alpha channel of a bitmap into its own mask.
pub fn extract(image: &Bitmap) -> AlphaMask {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y)[3]])
    })
}

/// Return a copy of `image` whose alpha channel is taken from `mask`.
///
/// The mask must have the same dimensions as the image.
pub fn replace(image: &Bitmap, mask: &AlphaMask) -> Bitmap {
    debug_assert_eq!(image.dimensions(), mask.dimensions());
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, _] = image.get_pixel(x, y).0;
        Rgba([r, g, b, mask.get_pixel(x, y)[0]])
    })
}

/// Per-pixel minimum of two masks of equal size.
pub fn min(a: &AlphaMask, b: &AlphaMask) -> AlphaMask {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        Luma([a.get_pixel(x, y)[0].min(b.get_pixel(x, y)[0])])
    })
}

/// Write `patch` into `mask` with its top-left corner at (`x`, `y`).
///
/// Parts of the patch falling outside the mask are dropped.
pub fn imprint(mut mask: AlphaMask, patch: &AlphaMask, x: i64, y: i64) -> AlphaMask {
    imageops::replace(&mut mask, patch, x, y);
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_then_replace_is_identity() {
        let image = RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8, y as u8, 7, (x * 40 + y) as u8]));
        let mask = extract(&image);
        assert_eq!(replace(&image, &mask), image);
    }

    #[test]
    fn test_min_takes_lower_value() {
        let a = GrayImage::from_pixel(2, 1, Luma([100]));
        let mut b = GrayImage::from_pixel(2, 1, Luma([200]));
        b.put_pixel(1, 0, Luma([5]));
        let m = min(&a, &b);
        assert_eq!(m.get_pixel(0, 0)[0], 100);
        assert_eq!(m.get_pixel(1, 0)[0], 5);
    }

    #[test]
    fn test_imprint_clips_to_bounds() {
        let mask = GrayImage::from_pixel(4, 4, Luma([1]));
        let patch = GrayImage::from_pixel(3, 3, Luma([9]));
        let out = imprint(mask, &patch, -1, 2);
        assert_eq!(out.get_pixel(0, 2)[0], 9);
        assert_eq!(out.get_pixel(1, 3)[0], 9);
        assert_eq!(out.get_pixel(2, 2)[0], 1);
        assert_eq!(out.get_pixel(0, 1)[0], 1);
    }

    #[test]
    fn test_imprint_fully_outside_is_noop() {
        let mask = GrayImage::from_pixel(3, 3, Luma([4]));
        let patch = GrayImage::from_pixel(2, 2, Luma([200]));
        assert_eq!(imprint(mask.clone(), &patch, 5, 0), mask);
        assert_eq!(imprint(mask.clone(), &patch, -2, -2), mask);
    }
}
