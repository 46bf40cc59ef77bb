//! # Runner
//!
//! The two ways a transform is driven: once against the clipboard, or over
//! a batch of files where each file succeeds or fails on its own.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::{
    animation::AnimatedFrameProcessor,
    config::Config,
    error::{PasteFxError, Result},
    io::{loader, writer, BitmapSink, BitmapSource, Notifier},
    pipeline::{CompositingPipeline, TransformKind},
};

const READ_OK: &str = "✅ Read image from clipboard";
const WRITE_OK: &str = "✅ Copied processed image to clipboard";
const NO_IMAGE: &str = "❌ No image on clipboard";

/// Where the output for `input` goes: `<stem><suffix>.<png|gif>` beside it.
pub fn output_path(input: &Path, kind: TransformKind) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = if loader::is_animated_path(input) { "gif" } else { "png" };
    input.with_file_name(format!("{}{}.{}", stem, kind.file_suffix(), extension))
}

/// Transform one file and write the result next to it.
///
/// GIF inputs go through the animated pipeline and are written as GIF;
/// everything else is decoded as a still image and written as RGBA PNG.
pub fn process_file(path: &Path, pipeline: &CompositingPipeline, kind: TransformKind, config: &Config) -> Result<PathBuf> {
    let output = output_path(path, kind);

    if loader::is_animated_path(path) {
        let sequence = loader::load_animation(path, config.output.default_frame_ms)?;
        let processed = AnimatedFrameProcessor::new(pipeline)
            .with_dither(config.output.dither)
            .process_sequence(&sequence)?;
        writer::write_gif(&processed, &output)?;
    } else {
        let bitmap = loader::load_bitmap(path)?;
        let processed = pipeline.apply_transform(&bitmap)?;
        writer::write_png(&processed, &output)?;
    }

    Ok(output)
}

/// Outcome of a file-mode run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, PasteFxError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        format!("{} processed, {} failed", self.written.len(), self.failed.len())
    }
}

/// Process every path independently; a failure is recorded and the batch
/// moves on.
pub fn run_files(paths: &[PathBuf], pipeline: &CompositingPipeline, kind: TransformKind, config: &Config) -> BatchReport {
    let mut report = BatchReport::default();

    for path in paths {
        info!("Processing {:?}", path);
        match process_file(path, pipeline, kind, config) {
            Ok(output) => report.written.push(output),
            Err(e) => {
                error!("Failed to process {:?}: {}", path, e);
                report.failed.push((path.clone(), e));
            }
        }
    }

    info!("Batch finished: {}", report.summary());
    report
}

/// The clipboard and the user, as seen by [`run_clipboard`].
pub struct ClipboardPorts<'a> {
    pub source: &'a dyn BitmapSource,
    pub sink: &'a dyn BitmapSink,
    pub notifier: &'a dyn Notifier,
}

fn send(notifier: &dyn Notifier, title: &str, message: &str) {
    if let Err(e) = notifier.notify(title, message) {
        warn!("Notification not delivered: {}", e);
    }
}

/// Read the clipboard image, transform it and put the result back.
///
/// The pipeline is built only after an image was found, so a missing
/// resource is reported the same way as any other failure. Every outcome is
/// announced through the notifier under `title`.
pub fn run_clipboard<F>(ports: &ClipboardPorts<'_>, title: &str, build_pipeline: F) -> Result<()>
where
    F: FnOnce() -> Result<CompositingPipeline>,
{
    let result = (|| -> Result<()> {
        let bitmap = ports.source.read_bitmap()?;
        info!("Clipboard image {}x{}", bitmap.width(), bitmap.height());
        send(ports.notifier, title, READ_OK);

        let pipeline = build_pipeline()?;
        let processed = pipeline.apply_transform(&bitmap)?;
        ports.sink.write_bitmap(&processed)?;
        send(ports.notifier, title, WRITE_OK);
        Ok(())
    })();

    if let Err(e) = &result {
        error!("{} failed: {}", title, e);
        let message = if e.is_input_error() {
            NO_IMAGE.to_string()
        } else {
            format!("❌ Error: {}", e.user_message())
        };
        send(ports.notifier, title, &message);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{MemoryClipboard, RecordingNotifier};
    use crate::pipeline::Transform;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    #[test]
    fn test_output_names() {
        assert_eq!(
            output_path(Path::new("/shots/a.b.png"), TransformKind::Beautify),
            PathBuf::from("/shots/a.b_beautified.png")
        );
        assert_eq!(
            output_path(Path::new("/shots/anim.GIF"), TransformKind::TornEdge),
            PathBuf::from("/shots/anim_torn.gif")
        );
        assert_eq!(
            output_path(Path::new("photo.jpg"), TransformKind::WhiteBg),
            PathBuf::from("photo_whitebg.png")
        );
        assert_eq!(
            output_path(Path::new("x.bmp"), TransformKind::PadText),
            PathBuf::from("x_padded.png")
        );
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.png");
        RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0])).save(&good).unwrap();
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"not a png").unwrap();
        let missing = dir.path().join("missing.png");

        let pipeline = CompositingPipeline::new(Transform::WhiteBg);
        let report = run_files(
            &[bad.clone(), good.clone(), missing],
            &pipeline,
            TransformKind::WhiteBg,
            &Config::default(),
        );

        assert_eq!(report.written, vec![dir.path().join("good_whitebg.png")]);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0].0, bad);
        assert!(!report.is_success());
        assert_eq!(report.summary(), "1 processed, 2 failed");

        let written = loader::load_bitmap(&report.written[0]).unwrap();
        assert!(written.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_clipboard_round_trip() {
        let clipboard = MemoryClipboard::with_bitmap(RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 0])));
        let notifier = RecordingNotifier::new();
        let ports = ClipboardPorts {
            source: &clipboard,
            sink: &clipboard,
            notifier: &notifier,
        };

        run_clipboard(&ports, "WhiteBG Processor", || Ok(CompositingPipeline::new(Transform::WhiteBg))).unwrap();

        let result = clipboard.contents().unwrap();
        assert!(result.pixels().all(|p| p.0 == [255, 255, 255, 255]));
        let messages: Vec<String> = notifier.messages().into_iter().map(|(_, m)| m).collect();
        assert_eq!(messages, vec![READ_OK.to_string(), WRITE_OK.to_string()]);
    }

    #[test]
    fn test_clipboard_without_image() {
        let clipboard = MemoryClipboard::new();
        let notifier = RecordingNotifier::new();
        let ports = ClipboardPorts {
            source: &clipboard,
            sink: &clipboard,
            notifier: &notifier,
        };

        let err = run_clipboard(&ports, "Beautify Screenshot", || {
            Ok(CompositingPipeline::new(Transform::Identity))
        })
        .unwrap_err();

        assert!(err.is_input_error());
        assert_eq!(
            notifier.messages(),
            vec![("Beautify Screenshot".to_string(), NO_IMAGE.to_string())]
        );
        assert!(clipboard.contents().is_none());
    }

    #[test]
    fn test_clipboard_missing_resource_is_reported() {
        let clipboard = MemoryClipboard::with_bitmap(RgbaImage::new(2, 2));
        let notifier = RecordingNotifier::new();
        let ports = ClipboardPorts {
            source: &clipboard,
            sink: &clipboard,
            notifier: &notifier,
        };

        let result = run_clipboard(&ports, "Torn Edge Effect", || {
            Err(PasteFxError::MissingResource {
                path: "base.png".to_string(),
            })
        });

        assert!(matches!(result, Err(PasteFxError::MissingResource { .. })));
        let messages = notifier.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].1, "❌ Error: Cannot find base.png");
    }
}
