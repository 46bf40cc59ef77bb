//! Side-effect boundaries: where bitmaps, text, fonts and references come
//! from, where results go, and how the user is told about it.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::{
    bitmap::Bitmap,
    config::TEXT_ENV,
    error::{PasteFxError, Result},
    io::loader,
    text::{self, TextRenderer},
};

/// Supplies the input bitmap in clipboard mode.
pub trait BitmapSource {
    fn read_bitmap(&self) -> Result<Bitmap>;
}

/// Receives the output bitmap in clipboard mode.
pub trait BitmapSink {
    fn write_bitmap(&self, bitmap: &Bitmap) -> Result<()>;
}

/// Supplies the text drawn by `pad_text`; `None` selects the default text.
pub trait TextSource {
    fn read_text(&self) -> Option<String>;
}

/// Loads the torn-edge reference bitmap.
pub trait ReferenceLoader {
    fn load_reference(&self, path: &Path) -> Result<Bitmap>;
}

/// Loads a font for `pad_text`.
pub trait FontLoader {
    fn load_font(&self, path: &Path, size: f32) -> Result<Arc<dyn TextRenderer>>;
}

/// Reports progress and failures to the user.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str) -> Result<()>;
}

/// Reads the reference bitmap from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReferenceLoader;

impl ReferenceLoader for FsReferenceLoader {
    fn load_reference(&self, path: &Path) -> Result<Bitmap> {
        if !path.is_file() {
            return Err(PasteFxError::MissingResource {
                path: path.display().to_string(),
            });
        }
        loader::load_bitmap(path)
    }
}

/// Reads the text from an environment variable, trimmed.
#[derive(Debug, Clone)]
pub struct EnvTextSource {
    var: String,
}

impl EnvTextSource {
    pub fn new<S: Into<String>>(var: S) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvTextSource {
    fn default() -> Self {
        Self::new(TEXT_ENV)
    }
}

impl TextSource for EnvTextSource {
    fn read_text(&self) -> Option<String> {
        std::env::var(&self.var).ok().map(|text| text.trim().to_string())
    }
}

/// Fixed text, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticText(Option<String>);

impl StaticText {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self(Some(text.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl TextSource for StaticText {
    fn read_text(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Outline fonts from disk, with system fallbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFontLoader;

impl FontLoader for SystemFontLoader {
    fn load_font(&self, path: &Path, size: f32) -> Result<Arc<dyn TextRenderer>> {
        Ok(Arc::new(text::load_font(path, size)?))
    }
}

/// Hands out the same font whatever is asked for.
#[derive(Clone)]
pub struct FixedFontLoader {
    font: Arc<dyn TextRenderer>,
}

impl FixedFontLoader {
    pub fn new<F: TextRenderer + 'static>(font: F) -> Self {
        Self { font: Arc::new(font) }
    }
}

impl FontLoader for FixedFontLoader {
    fn load_font(&self, _path: &Path, _size: f32) -> Result<Arc<dyn TextRenderer>> {
        Ok(Arc::clone(&self.font))
    }
}

/// macOS notifications through `osascript`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsascriptNotifier;

/// Escape a string for use inside an AppleScript double-quoted literal.
fn applescript_quote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl OsascriptNotifier {
    pub fn script(title: &str, message: &str) -> String {
        format!(
            "display notification \"{}\" with title \"{}\"",
            applescript_quote(message),
            applescript_quote(title)
        )
    }
}

impl Notifier for OsascriptNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<()> {
        let status = Command::new("osascript")
            .arg("-e")
            .arg(Self::script(title, message))
            .status()
            .map_err(|e| PasteFxError::Notify {
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(PasteFxError::Notify {
                reason: format!("osascript exited with {}", status),
            });
        }
        Ok(())
    }
}

/// Writes notifications to the log instead of the desktop.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<()> {
        info!("[{}] {}", title, message);
        Ok(())
    }
}

/// Keeps every notification for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(title, message)` pairs in the order they were sent.
    pub fn messages(&self) -> Vec<(String, String)> {
        match self.messages.lock() {
            Ok(messages) => messages.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<()> {
        let mut messages = match self.messages.lock() {
            Ok(messages) => messages,
            Err(poisoned) => poisoned.into_inner(),
        };
        messages.push((title.to_string(), message.to_string()));
        Ok(())
    }
}

/// An in-memory clipboard.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    content: Mutex<Option<Bitmap>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bitmap(bitmap: Bitmap) -> Self {
        Self {
            content: Mutex::new(Some(bitmap)),
        }
    }

    pub fn contents(&self) -> Option<Bitmap> {
        match self.content.lock() {
            Ok(content) => content.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl BitmapSource for MemoryClipboard {
    fn read_bitmap(&self) -> Result<Bitmap> {
        self.contents().ok_or_else(|| PasteFxError::NoInputAvailable {
            reason: "clipboard is empty".to_string(),
        })
    }
}

impl BitmapSink for MemoryClipboard {
    fn write_bitmap(&self, bitmap: &Bitmap) -> Result<()> {
        let mut content = match self.content.lock() {
            Ok(content) => content,
            Err(poisoned) => poisoned.into_inner(),
        };
        *content = Some(bitmap.clone());
        Ok(())
    }
}

/// The operating system clipboard.
///
/// Needs the `clipboard` feature; without it reading reports
/// `NoInputAvailable` and writing fails.
///
/// Results are handed over as straight RGBA pixels. arboard converts them to
/// the platform's clipboard image formats itself (an RGBA `image/png` on
/// X11 and Wayland), so alpha survives the paste without a second encode here.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

#[cfg(feature = "clipboard")]
impl BitmapSource for SystemClipboard {
    fn read_bitmap(&self) -> Result<Bitmap> {
        let no_input = |reason: String| PasteFxError::NoInputAvailable { reason };
        let mut clipboard = arboard::Clipboard::new().map_err(|e| no_input(e.to_string()))?;

        match clipboard.get_image() {
            Ok(data) => {
                tracing::debug!("Clipboard image {}x{}", data.width, data.height);
                return image::RgbaImage::from_raw(data.width as u32, data.height as u32, data.bytes.into_owned())
                    .ok_or_else(|| no_input("clipboard image has an inconsistent size".to_string()));
            }
            Err(e) => tracing::debug!("No raw image on clipboard: {}", e),
        }

        // A copied file shows up as its path.
        let text = clipboard.get_text().map_err(|e| no_input(e.to_string()))?;
        let path = PathBuf::from(text.trim());
        if path.is_file() {
            info!("Reading clipboard file {:?}", path);
            return loader::load_bitmap(&path);
        }
        Err(no_input("no image on the clipboard".to_string()))
    }
}

#[cfg(not(feature = "clipboard"))]
impl BitmapSource for SystemClipboard {
    fn read_bitmap(&self) -> Result<Bitmap> {
        tracing::warn!("Built without clipboard support");
        Err(PasteFxError::NoInputAvailable {
            reason: "clipboard support not compiled in".to_string(),
        })
    }
}

#[cfg(feature = "clipboard")]
impl BitmapSink for SystemClipboard {
    fn write_bitmap(&self, bitmap: &Bitmap) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| PasteFxError::encode(e.to_string()))?;
        let data = arboard::ImageData {
            width: bitmap.width() as usize,
            height: bitmap.height() as usize,
            bytes: std::borrow::Cow::Borrowed(bitmap.as_raw()),
        };
        clipboard
            .set_image(data)
            .map_err(|e| PasteFxError::encode(format!("clipboard: {}", e)))
    }
}

#[cfg(not(feature = "clipboard"))]
impl BitmapSink for SystemClipboard {
    fn write_bitmap(&self, _bitmap: &Bitmap) -> Result<()> {
        Err(PasteFxError::encode("clipboard support not compiled in"))
    }
}

/// Split a tab-separated path list, dropping empty entries.
pub fn parse_file_list(raw: &str) -> Vec<PathBuf> {
    raw.split('\t')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_script_escapes_quotes() {
        let script = OsascriptNotifier::script("Pad \"Text\"", "C:\\tmp \"x\"");
        assert_eq!(
            script,
            "display notification \"C:\\\\tmp \\\"x\\\"\" with title \"Pad \\\"Text\\\"\""
        );
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.notify("T", "one").unwrap();
        notifier.notify("T", "two").unwrap();
        assert_eq!(
            notifier.messages(),
            vec![("T".to_string(), "one".to_string()), ("T".to_string(), "two".to_string())]
        );
    }

    #[test]
    fn test_memory_clipboard() {
        let clipboard = MemoryClipboard::new();
        let err = clipboard.read_bitmap().unwrap_err();
        assert!(err.is_input_error());

        let bitmap = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4]));
        clipboard.write_bitmap(&bitmap).unwrap();
        assert_eq!(clipboard.read_bitmap().unwrap(), bitmap);
    }

    #[test]
    fn test_missing_reference() {
        let err = FsReferenceLoader
            .load_reference(Path::new("/no/such/base.png"))
            .unwrap_err();
        assert!(matches!(err, PasteFxError::MissingResource { .. }));
    }

    #[test]
    fn test_env_text_is_trimmed() {
        std::env::set_var("PASTEFX_TEST_TEXT", "  hello \n");
        assert_eq!(
            EnvTextSource::new("PASTEFX_TEST_TEXT").read_text(),
            Some("hello".to_string())
        );
        assert_eq!(EnvTextSource::new("PASTEFX_TEST_UNSET_VAR").read_text(), None);
    }

    #[test]
    fn test_parse_file_list() {
        assert_eq!(
            parse_file_list("/a/b.png\t/c d/e.gif\t\t"),
            vec![PathBuf::from("/a/b.png"), PathBuf::from("/c d/e.gif")]
        );
        assert!(parse_file_list("").is_empty());
    }
}
