use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::bitmap::{Bitmap, LoopCount, PaletteSequence};
use crate::error::{PasteFxError, Result};

/// Encode `bitmap` as an 8-bit RGBA PNG.
///
/// The colour type is always RGBA, even for fully opaque input.
pub fn encode_png<W: Write>(bitmap: &Bitmap, out: W) -> Result<()> {
    let mut encoder = png::Encoder::new(out, bitmap.width(), bitmap.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| PasteFxError::encode(format!("png header: {}", e)))?;
    writer
        .write_image_data(bitmap.as_raw())
        .map_err(|e| PasteFxError::encode(format!("png data: {}", e)))?;
    writer
        .finish()
        .map_err(|e| PasteFxError::encode(format!("png finish: {}", e)))?;
    Ok(())
}

pub fn write_png<P: AsRef<Path>>(bitmap: &Bitmap, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    encode_png(bitmap, BufWriter::new(file))?;
    info!("Wrote {}x{} PNG to {:?}", bitmap.width(), bitmap.height(), path);
    Ok(())
}

/// Centiseconds, rounded to nearest, as stored in a GIF frame header.
fn delay_centis(duration_ms: u32) -> u16 {
    ((duration_ms + 5) / 10).min(u16::MAX as u32) as u16
}

/// Encode a palette sequence as an animated GIF.
///
/// The shared palette is written as the global colour table and every frame
/// names the reserved slot as its transparency index. Frames are disposed to
/// background so transparent areas do not show the previous frame.
pub fn encode_gif<W: Write>(sequence: &PaletteSequence, out: W) -> Result<()> {
    let first = sequence.frames.first().ok_or(PasteFxError::EmptySequence)?;
    let (width, height) = (first.image.width, first.image.height);
    if width > u16::MAX as u32 || height > u16::MAX as u32 {
        return Err(PasteFxError::invalid_argument(format!(
            "{}x{} exceeds the GIF maximum of 65535x65535",
            width, height
        )));
    }

    let palette = first.image.palette.to_rgb_bytes();
    let mut encoder = gif::Encoder::new(out, width as u16, height as u16, &palette)
        .map_err(|e| PasteFxError::encode(format!("gif header: {}", e)))?;

    let repeat = match sequence.loop_count {
        LoopCount::Infinite => gif::Repeat::Infinite,
        LoopCount::Finite(n) => gif::Repeat::Finite(n),
    };
    encoder
        .set_repeat(repeat)
        .map_err(|e| PasteFxError::encode(format!("gif loop: {}", e)))?;

    for (index, frame) in sequence.frames.iter().enumerate() {
        let image = &frame.image;
        if (image.width, image.height) != (width, height) {
            return Err(PasteFxError::invalid_argument(format!(
                "frame {} is {}x{}, expected {}x{}",
                index, image.width, image.height, width, height
            )));
        }

        let gif_frame = gif::Frame {
            width: width as u16,
            height: height as u16,
            delay: delay_centis(frame.duration_ms),
            dispose: gif::DisposalMethod::Background,
            transparent: Some(image.transparent_index),
            buffer: Cow::Borrowed(image.indices.as_slice()),
            ..Default::default()
        };
        encoder
            .write_frame(&gif_frame)
            .map_err(|e| PasteFxError::encode(format!("gif frame {}: {}", index, e)))?;
    }
    Ok(())
}

pub fn write_gif<P: AsRef<Path>>(sequence: &PaletteSequence, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    encode_gif(sequence, BufWriter::new(file))?;
    info!("Wrote {}-frame GIF to {:?}", sequence.len(), path);
    Ok(())
}
