//! # Animated Sequences
//!
//! Applies a still-image transform to every frame of an animation, then
//! re-quantises all frames onto one shared 255-colour NeuQuant palette with a
//! reserved transparent slot. Quantising the union rather than each frame keeps colours
//! stable between frames.

pub mod processor;
pub mod quantize;

pub use processor::{process_sequence, AnimatedFrameProcessor, ALPHA_THRESHOLD};
pub use quantize::{SharedPalette, MAX_OPAQUE_COLORS, TRANSPARENT_INDEX};
