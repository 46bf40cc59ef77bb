//! # Bitmap Types
//!
//! Pixel containers shared by every transform: RGBA bitmaps, single-channel
//! alpha masks, animated sequences and their palette-indexed output form.

pub mod types;

pub use types::{
    AlphaMask, AnimatedFrame, AnimatedSequence, Bitmap, Color, LoopCount, Palette, PaletteFrame,
    PaletteImage, PaletteSequence,
};
