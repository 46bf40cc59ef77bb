//! # Compositing Pipeline
//!
//! Still-image transforms. The set of transforms is closed, so each one is a
//! variant of [`Transform`] carrying its own parameters; the pipeline
//! dispatches on the variant.

use std::sync::Arc;

use clap::ValueEnum;
use image::{imageops, RgbaImage};
use tracing::{debug, info};

use crate::{
    bitmap::{Bitmap, Color},
    config::{BeautifyConfig, Config},
    effects::{blend, edge_mask, gradient, rounded, EdgeSelector},
    error::{PasteFxError, Result},
    io::ports::{FontLoader, ReferenceLoader, TextSource},
    text::{self, TextRenderer},
};

/// The transform selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum TransformKind {
    /// Rounded corners on a gradient background
    Beautify,
    /// Torn-paper edges copied from a reference image
    #[value(name = "torn_edge")]
    TornEdge,
    /// Flatten transparency onto white
    #[value(name = "whitebg")]
    WhiteBg,
    /// Append a band of wrapped text below the image
    #[value(name = "pad_text")]
    PadText,
}

impl TransformKind {
    pub fn name(self) -> &'static str {
        match self {
            TransformKind::Beautify => "beautify",
            TransformKind::TornEdge => "torn_edge",
            TransformKind::WhiteBg => "whitebg",
            TransformKind::PadText => "pad_text",
        }
    }

    /// Suffix appended to the file stem of outputs in file mode.
    pub fn file_suffix(self) -> &'static str {
        match self {
            TransformKind::Beautify => "_beautified",
            TransformKind::TornEdge => "_torn",
            TransformKind::WhiteBg => "_whitebg",
            TransformKind::PadText => "_padded",
        }
    }
}

impl std::fmt::Display for TransformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of the `pad_text` transform.
#[derive(Clone)]
pub struct PadTextParams {
    pub text: String,
    pub font: Arc<dyn TextRenderer>,
    pub pad_color: Color,
    pub text_color: Color,
    pub max_width_ratio: f32,
    pub margin: u32,
}

impl std::fmt::Debug for PadTextParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PadTextParams")
            .field("text", &self.text)
            .field("pad_color", &self.pad_color)
            .field("text_color", &self.text_color)
            .field("max_width_ratio", &self.max_width_ratio)
            .field("margin", &self.margin)
            .finish_non_exhaustive()
    }
}

/// A still-image transform together with everything it needs to run.
///
/// Built once per invocation and never modified afterwards.
#[derive(Debug, Clone)]
pub enum Transform {
    Beautify(BeautifyConfig),
    TornEdge {
        reference: Bitmap,
        edge: EdgeSelector,
        thickness: u32,
    },
    WhiteBg,
    PadText(PadTextParams),
    /// Returns the input unchanged
    Identity,
}

/// External resources needed to build a [`Transform`] from configuration.
pub struct TransformResources<'a> {
    pub references: &'a dyn ReferenceLoader,
    pub text: &'a dyn TextSource,
    pub fonts: &'a dyn FontLoader,
}

impl Transform {
    /// Resolve `kind` against the configuration, loading any reference
    /// bitmap, text and font it needs.
    ///
    /// Fails with `MissingResource` when the torn-edge reference or every
    /// candidate font is unavailable.
    pub fn from_config(kind: TransformKind, config: &Config, resources: &TransformResources<'_>) -> Result<Self> {
        let transform = match kind {
            TransformKind::Beautify => Transform::Beautify(config.beautify.clone()),
            TransformKind::TornEdge => {
                let torn = &config.torn_edge;
                let reference = resources.references.load_reference(&torn.reference_path)?;
                info!(
                    "Loaded torn-edge reference {:?} ({}x{})",
                    torn.reference_path,
                    reference.width(),
                    reference.height()
                );
                Transform::TornEdge {
                    reference,
                    edge: torn.edge,
                    thickness: torn.thickness,
                }
            }
            TransformKind::WhiteBg => Transform::WhiteBg,
            TransformKind::PadText => {
                let pad = &config.pad_text;
                let text = resources
                    .text
                    .read_text()
                    .unwrap_or_else(|| pad.default_text.clone());
                let font = resources.fonts.load_font(&pad.font_path, pad.font_size)?;
                Transform::PadText(PadTextParams {
                    text,
                    font,
                    pad_color: pad.pad_color,
                    text_color: pad.text_color,
                    max_width_ratio: pad.max_width_ratio,
                    margin: pad.margin,
                })
            }
        };
        Ok(transform)
    }

    pub fn kind(&self) -> Option<TransformKind> {
        match self {
            Transform::Beautify(_) => Some(TransformKind::Beautify),
            Transform::TornEdge { .. } => Some(TransformKind::TornEdge),
            Transform::WhiteBg => Some(TransformKind::WhiteBg),
            Transform::PadText(_) => Some(TransformKind::PadText),
            Transform::Identity => None,
        }
    }
}

/// Apply `transform` to `bitmap`, returning a new bitmap.
///
/// Only `Beautify` and `PadText` change the canvas size.
pub fn apply_transform(transform: &Transform, bitmap: &Bitmap) -> Result<Bitmap> {
    if bitmap.width() == 0 || bitmap.height() == 0 {
        return Err(PasteFxError::invalid_argument(format!(
            "cannot transform an empty {}x{} bitmap",
            bitmap.width(),
            bitmap.height()
        )));
    }

    let output = match transform {
        Transform::Beautify(params) => beautify(bitmap, params),
        Transform::TornEdge {
            reference,
            edge,
            thickness,
        } => edge_mask::transfer(bitmap, reference, *edge, *thickness),
        Transform::WhiteBg => white_background(bitmap),
        Transform::PadText(params) => pad_text(bitmap, params),
        Transform::Identity => bitmap.clone(),
    };
    Ok(output)
}

/// Round the corners, then centre the result on a padded gradient canvas.
pub fn beautify(image: &Bitmap, params: &BeautifyConfig) -> Bitmap {
    let radius = params.radius_for(image.width());
    let rounded = rounded::apply(image, radius);

    let padding = params.padding_for(rounded.width());
    let size = (rounded.width() + 2 * padding, rounded.height() + 2 * padding);
    debug!(
        "Beautify: radius {}, padding {}, canvas {}x{}",
        radius, padding, size.0, size.1
    );

    let background = gradient::fill(size, params.start_color, params.end_color);
    let x = (size.0 - rounded.width()) / 2;
    let y = (size.1 - rounded.height()) / 2;
    blend::paste_with_alpha(&background, &rounded, x as i64, y as i64)
}

/// Composite over opaque white; the result is fully opaque.
pub fn white_background(image: &Bitmap) -> Bitmap {
    blend::flatten(image, Color::WHITE)
}

/// Extend the canvas downwards with a band of wrapped, centred text.
pub fn pad_text(image: &Bitmap, params: &PadTextParams) -> Bitmap {
    let (width, height) = image.dimensions();
    let max_width = (width as f32 * params.max_width_ratio) as u32;
    let wrapped = text::wrap(&params.text, params.font.as_ref(), max_width);

    let band = wrapped.height + params.margin;
    debug!(
        "Pad text: {} lines, band {}px, wrap width {}px",
        wrapped.lines.len(),
        band,
        max_width
    );

    let background = Color {
        a: 255,
        ..params.pad_color
    };
    let mut canvas = RgbaImage::from_pixel(width, height + band, background.to_rgba());
    imageops::replace(&mut canvas, image, 0, 0);

    let mut y = (height + params.margin / 2) as i32;
    for line in &wrapped.lines {
        let bbox = params.font.text_bbox(line);
        let x = (width as i32 - bbox.width() as i32).div_euclid(2);
        params.font.draw_text(&mut canvas, x, y, line, params.text_color);
        y += bbox.height() as i32;
    }

    canvas
}

/// Applies one configured [`Transform`] to still images.
#[derive(Debug, Clone)]
pub struct CompositingPipeline {
    transform: Transform,
}

impl CompositingPipeline {
    pub fn new(transform: Transform) -> Self {
        Self { transform }
    }

    pub fn from_config(kind: TransformKind, config: &Config, resources: &TransformResources<'_>) -> Result<Self> {
        Ok(Self::new(Transform::from_config(kind, config, resources)?))
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn apply_transform(&self, bitmap: &Bitmap) -> Result<Bitmap> {
        apply_transform(&self.transform, bitmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ports::{FixedFontLoader, FsReferenceLoader, StaticText};
    use crate::text::BlockFont;
    use image::Rgba;

    fn opaque(width: u32, height: u32, color: [u8; 4]) -> Bitmap {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    fn pad_params(text: &str) -> PadTextParams {
        PadTextParams {
            text: text.to_string(),
            font: Arc::new(BlockFont::new(10, 12)),
            pad_color: Color::rgb(200, 200, 200),
            text_color: Color::BLACK,
            max_width_ratio: 0.9,
            margin: 20,
        }
    }

    #[test]
    fn test_beautify_default_100x100() {
        let image = opaque(100, 100, [10, 200, 30, 255]);
        let out = beautify(&image, &BeautifyConfig::default());
        assert_eq!(out.dimensions(), (110, 110));

        // Gradient visible in the 5px border, start colour on top, end at bottom.
        assert_eq!(out.get_pixel(50, 0).0, [102, 42, 197, 255]);
        assert_eq!(out.get_pixel(50, 109).0, [238, 61, 165, 255]);
        assert_eq!(out.get_pixel(2, 50)[3], 255);

        // Rounded corner of the pasted image shows the gradient.
        let corner = out.get_pixel(5, 5);
        assert_ne!(corner.0, [10, 200, 30, 255]);
        assert_eq!(out.get_pixel(55, 55).0, [10, 200, 30, 255]);
        assert!(out.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_beautify_small_image_has_no_padding() {
        let image = opaque(10, 10, [1, 2, 3, 255]);
        let out = beautify(&image, &BeautifyConfig::default());
        assert_eq!(out.dimensions(), (10, 10));
    }

    #[test]
    fn test_whitebg_transparent_becomes_white() {
        let image = opaque(10, 10, [0, 0, 0, 0]);
        let out = apply_transform(&Transform::WhiteBg, &image).unwrap();
        assert_eq!(out.dimensions(), (10, 10));
        assert!(out.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_pad_text_extends_canvas() {
        let image = opaque(100, 40, [0, 0, 255, 255]);
        // 9 chars * 10px = 90px fits within 100 * 0.9
        let out = pad_text(&image, &pad_params("abcdefghi"));
        assert_eq!(out.dimensions(), (100, 40 + 12 + 20));

        // Source pixels are copied unchanged.
        assert_eq!(out.get_pixel(50, 20).0, [0, 0, 255, 255]);
        // Band background, above the text.
        assert_eq!(out.get_pixel(50, 45).0, [200, 200, 200, 255]);
        // Text block centred: starts at x = 5, y = 50.
        assert_eq!(out.get_pixel(5, 50).0, [0, 0, 0, 255]);
        assert_eq!(out.get_pixel(4, 50).0, [200, 200, 200, 255]);
    }

    #[test]
    fn test_pad_text_wraps_lines() {
        let image = opaque(50, 10, [0, 0, 255, 255]);
        // 45px wrap width fits 4 blocks per line.
        let out = pad_text(&image, &pad_params("一二三四五六"));
        assert_eq!(out.dimensions(), (50, 10 + 24 + 20));
        // Second line ("五六", 20px wide) is centred at x = 15.
        assert_eq!(out.get_pixel(15, 10 + 10 + 12).0, [0, 0, 0, 255]);
        assert_eq!(out.get_pixel(14, 10 + 10 + 12).0, [200, 200, 200, 255]);
    }

    #[test]
    fn test_pad_text_keeps_transparency_of_source() {
        let image = opaque(20, 20, [9, 9, 9, 0]);
        let out = pad_text(&image, &pad_params(""));
        assert_eq!(out.dimensions(), (20, 40));
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(0, 30).0, [200, 200, 200, 255]);
    }

    #[test]
    fn test_empty_bitmap_rejected() {
        let err = apply_transform(&Transform::WhiteBg, &RgbaImage::new(0, 5)).unwrap_err();
        assert!(matches!(err, PasteFxError::InvalidArgument { .. }));
    }

    #[test]
    fn test_torn_edge_missing_reference() {
        let mut config = Config::default();
        config.torn_edge.reference_path = "/no/such/base.png".into();
        let resources = TransformResources {
            references: &FsReferenceLoader,
            text: &StaticText::new("x"),
            fonts: &FixedFontLoader::new(BlockFont::new(8, 8)),
        };
        let err = Transform::from_config(TransformKind::TornEdge, &config, &resources).unwrap_err();
        assert!(matches!(err, PasteFxError::MissingResource { .. }));
    }

    #[test]
    fn test_pad_text_from_config_uses_text_source() {
        let config = Config::default();
        let resources = TransformResources {
            references: &FsReferenceLoader,
            text: &StaticText::new("hello"),
            fonts: &FixedFontLoader::new(BlockFont::new(8, 8)),
        };
        let transform = Transform::from_config(TransformKind::PadText, &config, &resources).unwrap();
        match transform {
            Transform::PadText(params) => {
                assert_eq!(params.text, "hello");
                assert_eq!(params.margin, 20);
            }
            other => panic!("unexpected transform {:?}", other),
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(TransformKind::from_str("torn_edge", false).unwrap(), TransformKind::TornEdge);
        assert_eq!(TransformKind::from_str("whitebg", false).unwrap(), TransformKind::WhiteBg);
        assert_eq!(TransformKind::PadText.to_string(), "pad_text");
        assert_eq!(Transform::Identity.kind(), None);
    }
}
