//! # Pixel Effects
//!
//! The still-image building blocks used by the compositing pipeline. Every
//! function here takes its inputs by reference and returns a freshly
//! allocated bitmap or mask; nothing is modified in place across a call.
//!
//! - [`gradient`] - vertical two-colour gradient fill
//! - [`rounded`] - rounded-rectangle corner clipping
//! - [`edge_mask`] - torn-edge silhouette transfer between bitmaps
//! - [`alpha`] - alpha channel extraction and recombination
//! - [`blend`] - alpha compositing of one bitmap over another

pub mod alpha;
pub mod blend;
pub mod edge_mask;
pub mod gradient;
pub mod rounded;

pub use edge_mask::{EdgeSelector, Side};
