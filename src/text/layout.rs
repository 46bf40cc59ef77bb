use tracing::debug;

use crate::bitmap::{Bitmap, Color};

/// Bounding box of a rendered string drawn with its top-left anchor at the
/// origin. `right` is the rightmost extent including the final advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl TextBox {
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }
}

/// Measures strings in pixels for one font at one size.
pub trait FontMetrics {
    fn text_bbox(&self, text: &str) -> TextBox;
}

/// A font that can also draw.
pub trait TextRenderer: FontMetrics + Send + Sync {
    /// Draw `text` with its top-left anchor at (`x`, `y`), clipped to the canvas.
    fn draw_text(&self, canvas: &mut Bitmap, x: i32, y: i32, text: &str, color: Color);
}

/// Lines produced by [`wrap`] and the sum of their heights.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WrappedText {
    pub lines: Vec<String>,
    pub height: u32,
}

/// Greedy character-wise wrapping.
///
/// Characters are appended to the current line until the next one would push
/// the line's right edge past `max_width`; the line is then closed and the
/// character starts a new one. No word boundaries are assumed, so scripts
/// without spaces wrap correctly. A single character wider than `max_width`
/// still gets a line of its own. The height is the sum of each line's own
/// bounding-box height.
pub fn wrap<F: FontMetrics + ?Sized>(text: &str, font: &F, max_width: u32) -> WrappedText {
    let mut wrapped = WrappedText::default();
    let mut current = String::new();

    for ch in text.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);

        if font.text_bbox(&candidate).right > max_width as i32 {
            if !current.is_empty() {
                close_line(&mut wrapped, std::mem::take(&mut current), font);
            }
            current.push(ch);
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        close_line(&mut wrapped, current, font);
    }

    debug!(
        "Wrapped {} chars into {} lines ({} px tall, max width {})",
        text.chars().count(),
        wrapped.lines.len(),
        wrapped.height,
        max_width
    );
    wrapped
}

fn close_line<F: FontMetrics + ?Sized>(wrapped: &mut WrappedText, line: String, font: &F) {
    wrapped.height += font.text_bbox(&line).height();
    wrapped.lines.push(line);
}
