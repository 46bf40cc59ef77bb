//! # PasteFx
//!
//! Screenshot filters for the clipboard and the file manager: rounded corners
//! on a gradient background, torn-paper edges, flattening onto white, and a
//! band of wrapped text below the image.
//!
//! Still images go through a [`CompositingPipeline`]. Animated GIFs go through
//! the [`animation`] module, which runs the same pipeline on every frame and
//! re-quantises the results onto one shared palette.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pastefx::{
//!     io::{self, FsReferenceLoader, StaticText, SystemFontLoader},
//!     pipeline::{CompositingPipeline, TransformKind, TransformResources},
//!     Config,
//! };
//!
//! # fn main() -> pastefx::Result<()> {
//! let config = Config::default();
//! let resources = TransformResources {
//!     references: &FsReferenceLoader,
//!     text: &StaticText::none(),
//!     fonts: &SystemFontLoader,
//! };
//! let pipeline = CompositingPipeline::from_config(TransformKind::Beautify, &config, &resources)?;
//!
//! let screenshot = io::load_bitmap("shot.png")?;
//! let beautified = pipeline.apply_transform(&screenshot)?;
//! io::write_png(&beautified, "shot_beautified.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`effects`] - gradient fill, rounded mask, edge transfer and blending
//! - [`text`] - fonts and greedy wrapping
//! - [`pipeline`] - the closed set of still-image transforms
//! - [`animation`] - per-frame processing and shared-palette quantisation
//! - [`io`] - decoders, encoders and side-effect ports
//! - [`runner`] - clipboard and batch-file drivers
//! - [`config`] - configuration management

pub mod animation;
pub mod bitmap;
pub mod config;
pub mod effects;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod runner;
pub mod text;

// Re-export commonly used types for convenience
pub use crate::{
    animation::{process_sequence, AnimatedFrameProcessor},
    bitmap::{AnimatedSequence, Bitmap, Color, PaletteSequence},
    config::Config,
    error::{PasteFxError, Result},
    pipeline::{apply_transform, CompositingPipeline, Transform, TransformKind},
};
