use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    animation::quantize::{SharedPalette, TRANSPARENT_INDEX},
    bitmap::{AnimatedFrame, AnimatedSequence, PaletteFrame, PaletteImage, PaletteSequence},
    error::{PasteFxError, Result},
    pipeline::CompositingPipeline,
};

/// Pixels with alpha below this become the transparent palette slot.
pub const ALPHA_THRESHOLD: u8 = 128;

/// Runs a still-image pipeline over every frame of an animation and puts
/// the results on one shared palette.
pub struct AnimatedFrameProcessor<'a> {
    pipeline: &'a CompositingPipeline,
    dither: bool,
}

impl<'a> AnimatedFrameProcessor<'a> {
    pub fn new(pipeline: &'a CompositingPipeline) -> Self {
        Self { pipeline, dither: false }
    }

    /// Diffuse quantisation error when indexing frames.
    pub fn with_dither(mut self, dither: bool) -> Self {
        self.dither = dither;
        self
    }

    /// Transform each frame, then quantise all of them against a palette
    /// learned from their union.
    ///
    /// Frames are transformed in parallel; the first failure aborts the
    /// whole sequence. Durations and loop count are carried over unchanged.
    pub fn process_sequence(&self, sequence: &AnimatedSequence) -> Result<PaletteSequence> {
        if sequence.is_empty() {
            return Err(PasteFxError::EmptySequence);
        }

        let processed = self.transform_frames(sequence)?;
        processed.ensure_uniform_size()?;
        let (width, height) = processed.dimensions().ok_or(PasteFxError::EmptySequence)?;

        let shared = SharedPalette::learn(processed.frames.iter().map(|f| &f.image));
        let palette = shared.palette()?;
        info!(
            "Shared palette learned from {} frames ({}x{}, dither: {})",
            processed.len(),
            width,
            height,
            self.dither
        );

        let frames = processed
            .frames
            .par_iter()
            .map(|frame| PaletteFrame {
                image: PaletteImage {
                    width,
                    height,
                    indices: shared.map_frame(&frame.image, ALPHA_THRESHOLD, self.dither),
                    palette: palette.clone(),
                    transparent_index: TRANSPARENT_INDEX,
                },
                duration_ms: frame.duration_ms,
            })
            .collect();

        Ok(PaletteSequence {
            frames,
            loop_count: processed.loop_count,
        })
    }

    fn transform_frames(&self, sequence: &AnimatedSequence) -> Result<AnimatedSequence> {
        info!("Transforming {} frames", sequence.len());
        let frames = sequence
            .frames
            .par_iter()
            .enumerate()
            .map(|(i, frame)| {
                debug!("Frame {} ({}ms)", i, frame.duration_ms);
                let image = self.pipeline.apply_transform(&frame.image)?;
                Ok(AnimatedFrame::new(image, frame.duration_ms))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(AnimatedSequence::new(frames, sequence.loop_count))
    }
}

/// Convenience wrapper around [`AnimatedFrameProcessor::process_sequence`].
pub fn process_sequence(sequence: &AnimatedSequence, pipeline: &CompositingPipeline) -> Result<PaletteSequence> {
    AnimatedFrameProcessor::new(pipeline).process_sequence(sequence)
}
