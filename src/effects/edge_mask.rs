use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    bitmap::{AlphaMask, Bitmap},
    effects::alpha,
};

/// Which borders of the target receive the torn silhouette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeSelector {
    Top,
    Bottom,
    Left,
    Right,
    #[default]
    All,
}

impl EdgeSelector {
    /// Sides covered by this selector, in application order.
    pub fn sides(self) -> &'static [Side] {
        match self {
            EdgeSelector::Top => &[Side::Top],
            EdgeSelector::Bottom => &[Side::Bottom],
            EdgeSelector::Left => &[Side::Left],
            EdgeSelector::Right => &[Side::Right],
            EdgeSelector::All => &[Side::Top, Side::Bottom, Side::Left, Side::Right],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// Axis-aligned rectangle; `x`/`y` may be negative for boxes that hang
/// off the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Strip {
    x: i64,
    y: i64,
    width: u32,
    height: u32,
}

impl Side {
    fn is_horizontal(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }

    /// The band of `thickness` pixels along this side of a `width x height` area.
    fn strip(self, width: u32, height: u32, thickness: u32) -> Strip {
        let t = thickness as i64;
        match self {
            Side::Top => Strip { x: 0, y: 0, width, height: thickness },
            Side::Bottom => Strip { x: 0, y: height as i64 - t, width, height: thickness },
            Side::Left => Strip { x: 0, y: 0, width: thickness, height },
            Side::Right => Strip { x: width as i64 - t, y: 0, width: thickness, height },
        }
    }
}

/// Imprint the border alpha pattern of `reference` onto the borders of
/// `target`.
///
/// For every side selected by `edge`, a `thickness`-pixel strip is cut from
/// the matching border of `reference`; its alpha is resized with
/// nearest-neighbour sampling to the full length of the target's border and
/// replaces the target's alpha in that strip. A side is skipped when the
/// reference is thinner than `thickness` across it. Overlapping corners take
/// the value of the side applied last (top, bottom, left, right). Colour
/// channels and the alpha of the interior are untouched.
pub fn transfer(target: &Bitmap, reference: &Bitmap, edge: EdgeSelector, thickness: u32) -> Bitmap {
    if thickness == 0 {
        return target.clone();
    }

    let (target_w, target_h) = target.dimensions();
    let (ref_w, ref_h) = reference.dimensions();
    let reference_alpha = alpha::extract(reference);

    let mut mask = alpha::extract(target);
    for &side in edge.sides() {
        let available = if side.is_horizontal() { ref_h } else { ref_w };
        if thickness > available {
            warn!(
                "Skipping {:?} edge: thickness {} exceeds reference size {}",
                side, thickness, available
            );
            continue;
        }

        let source = side.strip(ref_w, ref_h, thickness);
        let dest = side.strip(target_w, target_h, thickness);
        debug!("Transferring {:?} edge {:?} -> {:?}", side, source, dest);

        let pattern = stencil(&reference_alpha, source, dest);
        mask = alpha::imprint(mask, &pattern, dest.x, dest.y);
    }

    alpha::replace(target, &mask)
}

/// Crop `source` from the reference alpha and resample it to the size of `dest`.
///
/// The crop always lies inside the reference because the caller checked the
/// thickness. Compositing full opacity over full transparency through the
/// stencil reproduces the stencil value itself, so the resampled alpha is
/// used as the new alpha directly.
fn stencil(reference_alpha: &AlphaMask, source: Strip, dest: Strip) -> AlphaMask {
    let cropped = imageops::crop_imm(
        reference_alpha,
        source.x as u32,
        source.y as u32,
        source.width,
        source.height,
    )
    .to_image();
    imageops::resize(&cropped, dest.width, dest.height, FilterType::Nearest)
}
