use image::{GrayImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{PasteFxError, Result};

/// An RGBA bitmap. Every transform consumes and produces this type.
pub type Bitmap = RgbaImage;

/// Single-channel opacity grid, 0 = transparent, 255 = opaque.
pub type AlphaMask = GrayImage;

/// An RGB or RGBA colour.
///
/// Serialises as `[r, g, b]` when fully opaque and `[r, g, b, a]` otherwise,
/// which keeps TOML configuration files short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl TryFrom<Vec<u8>> for Color {
    type Error = String;

    fn try_from(value: Vec<u8>) -> std::result::Result<Self, Self::Error> {
        match value.as_slice() {
            [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Color::rgba(*r, *g, *b, *a)),
            other => Err(format!(
                "expected 3 or 4 colour channels, got {}",
                other.len()
            )),
        }
    }
}

impl From<Color> for Vec<u8> {
    fn from(color: Color) -> Self {
        if color.a == 255 {
            vec![color.r, color.g, color.b]
        } else {
            vec![color.r, color.g, color.b, color.a]
        }
    }
}

/// How many times an animation plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopCount {
    #[default]
    Infinite,
    Finite(u16),
}

/// One decoded frame of an animation with its display time.
#[derive(Debug, Clone)]
pub struct AnimatedFrame {
    pub image: Bitmap,
    pub duration_ms: u32,
}

impl AnimatedFrame {
    pub fn new(image: Bitmap, duration_ms: u32) -> Self {
        Self { image, duration_ms }
    }
}

/// An ordered list of RGBA frames sharing one size, plus a loop count.
#[derive(Debug, Clone, Default)]
pub struct AnimatedSequence {
    pub frames: Vec<AnimatedFrame>,
    pub loop_count: LoopCount,
}

impl AnimatedSequence {
    pub fn new(frames: Vec<AnimatedFrame>, loop_count: LoopCount) -> Self {
        Self { frames, loop_count }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Dimensions of the first frame, if any
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.frames.first().map(|f| f.image.dimensions())
    }

    pub fn durations(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.duration_ms).collect()
    }

    /// Check that every frame has the size of the first one.
    pub fn ensure_uniform_size(&self) -> Result<()> {
        let Some(expected) = self.dimensions() else {
            return Err(PasteFxError::EmptySequence);
        };

        for (index, frame) in self.frames.iter().enumerate() {
            if frame.image.dimensions() != expected {
                return Err(PasteFxError::invalid_argument(format!(
                    "frame {} is {:?}, expected {:?}",
                    index,
                    frame.image.dimensions(),
                    expected
                )));
            }
        }
        Ok(())
    }
}

/// A 256-entry RGB colour table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<[u8; 3]>,
}

impl Palette {
    pub const SIZE: usize = 256;

    /// Build a palette from up to 256 colours, padding the rest with black.
    pub fn from_colors(mut colors: Vec<[u8; 3]>) -> Result<Self> {
        if colors.len() > Self::SIZE {
            return Err(PasteFxError::invalid_argument(format!(
                "palette holds at most {} colours, got {}",
                Self::SIZE,
                colors.len()
            )));
        }
        colors.resize(Self::SIZE, [0, 0, 0]);
        Ok(Self { colors })
    }

    pub fn get(&self, index: u8) -> [u8; 3] {
        self.colors[index as usize]
    }

    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }

    /// Flattened `r, g, b, r, g, b, ...` bytes, as GIF colour tables expect.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| c.iter().copied()).collect()
    }
}

/// A bitmap expressed as palette indices.
///
/// `transparent_index` is never used for an opaque colour.
#[derive(Debug, Clone)]
pub struct PaletteImage {
    pub width: u32,
    pub height: u32,
    pub indices: Vec<u8>,
    pub palette: Palette,
    pub transparent_index: u8,
}

impl PaletteImage {
    pub fn index_at(&self, x: u32, y: u32) -> u8 {
        self.indices[(y * self.width + x) as usize]
    }

    /// Expand back to RGBA; the transparent slot becomes `[0, 0, 0, 0]`.
    pub fn to_rgba(&self) -> Bitmap {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let index = self.index_at(x, y);
            if index == self.transparent_index {
                Rgba([0, 0, 0, 0])
            } else {
                let [r, g, b] = self.palette.get(index);
                Rgba([r, g, b, 255])
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct PaletteFrame {
    pub image: PaletteImage,
    pub duration_ms: u32,
}

/// Output of the animated pipeline: palette frames sharing one colour table.
#[derive(Debug, Clone)]
pub struct PaletteSequence {
    pub frames: Vec<PaletteFrame>,
    pub loop_count: LoopCount,
}

impl PaletteSequence {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn durations(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.duration_ms).collect()
    }
}
