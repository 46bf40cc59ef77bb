use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use image::{GenericImageView, Rgba, RgbaImage};
use tracing::{debug, info};

use crate::bitmap::{AnimatedFrame, AnimatedSequence, Bitmap, LoopCount};
use crate::error::{PasteFxError, Result};

/// True for paths that should go through the animated pipeline.
pub fn is_animated_path<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("gif"))
}

/// Decode a still image (PNG, JPEG, BMP) and normalise it to RGBA.
pub fn load_bitmap<P: AsRef<Path>>(path: P) -> Result<Bitmap> {
    let path = path.as_ref();
    let image = image::open(path)?;
    debug!("Loaded {:?} ({:?}, {:?})", path, image.color(), image.dimensions());
    Ok(into_rgba(image))
}

fn into_rgba(image: image::DynamicImage) -> Bitmap {
    match image {
        image::DynamicImage::ImageRgba8(img) => img,
        other => other.to_rgba8(),
    }
}

/// Decode every frame of an animated GIF file.
///
/// `default_frame_ms` replaces a zero frame delay.
pub fn load_animation<P: AsRef<Path>>(path: P, default_frame_ms: u32) -> Result<AnimatedSequence> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let sequence = decode_animation(BufReader::new(file), default_frame_ms)?;
    info!("Decoded {} frames from {:?}", sequence.len(), path);
    Ok(sequence)
}

fn gif_error(err: gif::DecodingError) -> PasteFxError {
    match err {
        gif::DecodingError::Io(e) => PasteFxError::Io(e),
        other => PasteFxError::UnsupportedFormat {
            format: format!("gif: {}", other),
        },
    }
}

/// Decode a GIF stream into full-size RGBA frames.
///
/// Partial frames are drawn onto a running canvas, and the canvas is updated
/// after each frame according to its disposal method. Delays are converted
/// from centiseconds to milliseconds. A stream without a loop extension is
/// treated as looping forever.
pub fn decode_animation<R: Read>(reader: R, default_frame_ms: u32) -> Result<AnimatedSequence> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options.read_info(reader).map_err(gif_error)?;

    let width = decoder.width() as u32;
    let height = decoder.height() as u32;
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let mut previous = canvas.clone();
    let mut frames = Vec::new();

    while let Some(frame) = decoder.read_next_frame().map_err(gif_error)? {
        let (left, top) = (frame.left as u32, frame.top as u32);
        let (frame_w, frame_h) = (frame.width as u32, frame.height as u32);

        if frame.dispose == gif::DisposalMethod::Previous {
            previous = canvas.clone();
        }

        for (i, px) in frame.buffer.chunks_exact(4).enumerate() {
            let (fx, fy) = (i as u32 % frame_w.max(1), i as u32 / frame_w.max(1));
            let (cx, cy) = (left + fx, top + fy);
            if px[3] > 0 && cx < width && cy < height {
                canvas.put_pixel(cx, cy, Rgba([px[0], px[1], px[2], px[3]]));
            }
        }

        let duration_ms = match frame.delay as u32 * 10 {
            0 => default_frame_ms,
            ms => ms,
        };
        frames.push(AnimatedFrame::new(canvas.clone(), duration_ms));

        match frame.dispose {
            gif::DisposalMethod::Background => {
                for cy in top..(top + frame_h).min(height) {
                    for cx in left..(left + frame_w).min(width) {
                        canvas.put_pixel(cx, cy, Rgba([0, 0, 0, 0]));
                    }
                }
            }
            gif::DisposalMethod::Previous => canvas = previous.clone(),
            _ => {}
        }
    }

    if frames.is_empty() {
        return Err(PasteFxError::EmptySequence);
    }

    let loop_count = match decoder.repeat() {
        gif::Repeat::Infinite | gif::Repeat::Finite(0) => LoopCount::Infinite,
        gif::Repeat::Finite(n) => LoopCount::Finite(n),
    };

    Ok(AnimatedSequence::new(frames, loop_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    /// Two 2x2 frames: a full red frame, then a 1x1 blue patch at (1, 1)
    /// disposed to background.
    fn two_frame_gif(repeat: Option<gif::Repeat>) -> Vec<u8> {
        let palette = [255, 0, 0, 0, 0, 255];
        let mut out = Vec::new();
        {
            let mut encoder = gif::Encoder::new(&mut out, 2, 2, &palette).unwrap();
            if let Some(repeat) = repeat {
                encoder.set_repeat(repeat).unwrap();
            }
            encoder
                .write_frame(&gif::Frame {
                    width: 2,
                    height: 2,
                    delay: 7,
                    buffer: Cow::Owned(vec![0, 0, 0, 0]),
                    ..Default::default()
                })
                .unwrap();
            encoder
                .write_frame(&gif::Frame {
                    left: 1,
                    top: 1,
                    width: 1,
                    height: 1,
                    delay: 0,
                    dispose: gif::DisposalMethod::Background,
                    buffer: Cow::Owned(vec![1]),
                    ..Default::default()
                })
                .unwrap();
        }
        out
    }

    #[test]
    fn test_animated_path_detection() {
        assert!(is_animated_path("a/b/clip.GIF"));
        assert!(is_animated_path("clip.gif"));
        assert!(!is_animated_path("shot.png"));
        assert!(!is_animated_path("gif"));
    }

    #[test]
    fn test_decode_composites_partial_frames() {
        let data = two_frame_gif(Some(gif::Repeat::Finite(2)));
        let sequence = decode_animation(data.as_slice(), 100).unwrap();

        assert_eq!(sequence.len(), 2);
        assert_eq!(sequence.durations(), vec![70, 100]);
        assert_eq!(sequence.loop_count, LoopCount::Finite(2));

        let second = &sequence.frames[1].image;
        assert_eq!(second.dimensions(), (2, 2));
        assert_eq!(second.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(second.get_pixel(1, 1).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_missing_loop_extension_means_infinite() {
        let data = two_frame_gif(None);
        let sequence = decode_animation(data.as_slice(), 100).unwrap();
        assert_eq!(sequence.loop_count, LoopCount::Infinite);
    }

    #[test]
    fn test_garbage_is_unsupported() {
        let err = decode_animation(&b"definitely not a gif"[..], 100).unwrap_err();
        assert!(matches!(err, PasteFxError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_rgb_file_is_normalised_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        image::RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3])).save(&path).unwrap();

        let bitmap = load_bitmap(&path).unwrap();
        assert_eq!(bitmap.dimensions(), (3, 2));
        assert_eq!(bitmap.get_pixel(2, 1).0, [1, 2, 3, 255]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_bitmap("/no/such/input.png").unwrap_err();
        assert!(matches!(err, PasteFxError::Io(_)));
    }
}
