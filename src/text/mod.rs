//! # Text Layout and Fonts
//!
//! Character-wise line wrapping for the text band added by `pad_text`, and
//! the font resources that measure and draw it.

pub mod font;
pub mod layout;

pub use font::{load_font, BlockFont, GlyphFont};
pub use layout::{wrap, FontMetrics, TextBox, TextRenderer, WrappedText};
