use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, Glyph, PxScale, ScaleFont};
use tracing::{debug, info, warn};

use crate::{
    bitmap::{Bitmap, Color},
    effects::blend,
    error::{PasteFxError, Result},
    text::layout::{FontMetrics, TextBox, TextRenderer},
};

/// Fonts tried, in order, when the configured font cannot be loaded.
const FALLBACK_FONTS: &[&str] = &[
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/Hiragino Sans GB.ttc",
    "/System/Library/Fonts/STHeiti Medium.ttc",
    "/System/Library/Fonts/Helvetica.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// An outline font rasterised at a fixed pixel size.
pub struct GlyphFont {
    font: FontVec,
    scale: PxScale,
    source: PathBuf,
}

impl std::fmt::Debug for GlyphFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphFont")
            .field("source", &self.source)
            .field("scale", &self.scale)
            .finish()
    }
}

impl GlyphFont {
    /// Parse a TrueType/OpenType font (first face of a collection).
    ///
    /// `size` is the em size in pixels.
    pub fn from_bytes(data: Vec<u8>, size: f32, source: PathBuf) -> Result<Self> {
        let font = FontVec::try_from_vec_and_index(data, 0).map_err(|e| {
            PasteFxError::UnsupportedFormat {
                format: format!("font {}: {}", source.display(), e),
            }
        })?;

        let scale = match font.units_per_em() {
            Some(units_per_em) => PxScale::from(size * font.height_unscaled() / units_per_em),
            None => PxScale::from(size),
        };

        Ok(Self {
            font,
            scale,
            source,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P, size: f32) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|_| PasteFxError::MissingResource {
            path: path.display().to_string(),
        })?;
        Self::from_bytes(data, size, path.to_path_buf())
    }

    /// Position glyphs for `text` with the top-left anchor at `origin`.
    /// Returns the glyphs and the caret x after the last advance.
    fn layout(&self, text: &str, origin: (f32, f32)) -> (Vec<Glyph>, f32) {
        let scaled = self.font.as_scaled(self.scale);
        let mut caret = point(origin.0, origin.1 + scaled.ascent());
        let mut previous = None;
        let mut glyphs = Vec::with_capacity(text.len());

        for ch in text.chars().filter(|c| !c.is_control()) {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                caret.x += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(self.scale, caret));
            caret.x += scaled.h_advance(id);
            previous = Some(id);
        }

        (glyphs, caret.x)
    }
}

impl FontMetrics for GlyphFont {
    fn text_bbox(&self, text: &str) -> TextBox {
        if text.is_empty() {
            return TextBox::default();
        }

        let (glyphs, advance) = self.layout(text, (0.0, 0.0));
        let mut ink: Option<(f32, f32, f32, f32)> = None;
        for glyph in glyphs {
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let b = outlined.px_bounds();
                ink = Some(match ink {
                    None => (b.min.x, b.min.y, b.max.x, b.max.y),
                    Some((l, t, r, bt)) => (l.min(b.min.x), t.min(b.min.y), r.max(b.max.x), bt.max(b.max.y)),
                });
            }
        }

        match ink {
            Some((left, top, right, bottom)) => TextBox {
                left: left.floor().min(0.0) as i32,
                top: top.floor() as i32,
                right: right.max(advance).ceil() as i32,
                bottom: bottom.ceil() as i32,
            },
            // Whitespace only: one line of the font's natural height.
            None => {
                let scaled = self.font.as_scaled(self.scale);
                TextBox {
                    left: 0,
                    top: 0,
                    right: advance.ceil() as i32,
                    bottom: (scaled.ascent() - scaled.descent()).ceil() as i32,
                }
            }
        }
    }
}

impl TextRenderer for GlyphFont {
    fn draw_text(&self, canvas: &mut Bitmap, x: i32, y: i32, text: &str, color: Color) {
        let (glyphs, _) = self.layout(text, (x as f32, y as f32));
        let (width, height) = (canvas.width() as i32, canvas.height() as i32);

        for glyph in glyphs {
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i32 + gx as i32;
                let py = bounds.min.y as i32 + gy as i32;
                if px >= 0 && py >= 0 && px < width && py < height {
                    blend::blend_coverage(canvas.get_pixel_mut(px as u32, py as u32), color, coverage);
                }
            });
        }
    }
}

/// Load the configured font, falling back to well-known system fonts.
///
/// Fails with `MissingResource` when nothing loads.
pub fn load_font<P: AsRef<Path>>(preferred: P, size: f32) -> Result<GlyphFont> {
    let preferred = preferred.as_ref();
    match GlyphFont::from_file(preferred, size) {
        Ok(font) => {
            info!("Loaded font {:?} at {}px", preferred, size);
            return Ok(font);
        }
        Err(e) => warn!("Font {:?} unavailable ({}), trying fallbacks", preferred, e),
    }

    for candidate in FALLBACK_FONTS {
        if let Ok(font) = GlyphFont::from_file(candidate, size) {
            info!("Using fallback font {}", candidate);
            return Ok(font);
        }
        debug!("Fallback font {} not usable", candidate);
    }

    Err(PasteFxError::MissingResource {
        path: preferred.display().to_string(),
    })
}

/// A fixed-advance font that draws every character as a solid block.
///
/// Glyph-free and deterministic, for headless runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct BlockFont {
    advance: u32,
    line_height: u32,
}

impl BlockFont {
    pub fn new(advance: u32, line_height: u32) -> Self {
        Self {
            advance,
            line_height,
        }
    }
}

impl FontMetrics for BlockFont {
    fn text_bbox(&self, text: &str) -> TextBox {
        let count = text.chars().count() as i32;
        if count == 0 {
            return TextBox::default();
        }
        TextBox {
            left: 0,
            top: 0,
            right: count * self.advance as i32,
            bottom: self.line_height as i32,
        }
    }
}

impl TextRenderer for BlockFont {
    fn draw_text(&self, canvas: &mut Bitmap, x: i32, y: i32, text: &str, color: Color) {
        let (width, height) = (canvas.width() as i32, canvas.height() as i32);
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            // One pixel of spacing keeps neighbouring blocks distinguishable.
            let x0 = x + (i as u32 * self.advance) as i32;
            for py in y..y + self.line_height as i32 {
                for px in x0..x0 + self.advance.saturating_sub(1) as i32 {
                    if px >= 0 && py >= 0 && px < width && py < height {
                        canvas.put_pixel(px as u32, py as u32, color.to_rgba());
                    }
                }
            }
        }
    }
}
