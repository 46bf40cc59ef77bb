use color_quant::NeuQuant;
use image::imageops;
use tracing::debug;

use crate::bitmap::{Bitmap, Palette};
use crate::error::Result;

/// Palette slot reserved for transparent pixels; never holds an opaque colour.
pub const TRANSPARENT_INDEX: u8 = 255;

/// Opaque colours available once the transparent slot is reserved.
pub const MAX_OPAQUE_COLORS: usize = 255;

/// NeuQuant sampling factor: 1 looks at every pixel, 30 is the fastest.
const SAMPLE_FACTOR: i32 = 10;

/// Below this many pixels every pixel is sampled; sparse sampling leaves the
/// network barely trained.
const SMALL_INPUT_PIXELS: usize = 16_384;

/// One NeuQuant palette trained on the RGB values of several images.
///
/// Alpha is ignored while learning and mapping; transparency is stamped on
/// afterwards so the reserved slot never competes with real colours.
pub struct SharedPalette {
    quantizer: NeuQuant,
}

impl SharedPalette {
    /// Train on the union of every pixel in `frames`.
    pub fn learn<'a, I>(frames: I) -> Self
    where
        I: IntoIterator<Item = &'a Bitmap>,
    {
        let mut pixels: Vec<u8> = frames
            .into_iter()
            .flat_map(|frame| frame.pixels())
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect();
        if pixels.is_empty() {
            pixels.extend_from_slice(&[0, 0, 0, 255]);
        }

        let count = pixels.len() / 4;
        let sample_factor = if count < SMALL_INPUT_PIXELS { 1 } else { SAMPLE_FACTOR };
        debug!("Learning palette from {} pixels (sample factor {})", count, sample_factor);
        Self {
            quantizer: NeuQuant::new(sample_factor, MAX_OPAQUE_COLORS, &pixels),
        }
    }

    /// The learned opaque colours, one per index.
    pub fn colors(&self) -> Vec<[u8; 3]> {
        self.quantizer
            .color_map_rgb()
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect()
    }

    /// Full 256-entry palette; the transparent slot stays black.
    pub fn palette(&self) -> Result<Palette> {
        Palette::from_colors(self.colors())
    }

    /// Index every pixel of `frame`.
    ///
    /// Pixels with alpha below `alpha_threshold` get [`TRANSPARENT_INDEX`].
    /// With `dither` set, quantisation error is diffused Floyd-Steinberg style
    /// over the opaque copy before indexing. Frames narrower or shorter than
    /// two pixels are never dithered.
    pub fn map_frame(&self, frame: &Bitmap, alpha_threshold: u8, dither: bool) -> Vec<u8> {
        let mut opaque = frame.clone();
        for pixel in opaque.pixels_mut() {
            pixel[3] = 255;
        }
        if dither && opaque.width() > 1 && opaque.height() > 1 {
            imageops::dither(&mut opaque, &self.quantizer);
        }

        imageops::index_colors(&opaque, &self.quantizer)
            .into_raw()
            .into_iter()
            .zip(frame.pixels())
            .map(|(index, pixel)| {
                if pixel[3] < alpha_threshold {
                    TRANSPARENT_INDEX
                } else {
                    index
                }
            })
            .collect()
    }
}
