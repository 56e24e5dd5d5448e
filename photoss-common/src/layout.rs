use serde::{Deserialize, Serialize};

use crate::decode::Rotation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Where a scaled image sits inside its viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Left padding, equal on both sides.
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Fits an image into `viewport` without cropping or distorting it.
///
/// `raw_width` and `raw_height` are the stored dimensions; `rotation` swaps
/// them. Portrait and rotated images fill the height and get side padding,
/// landscape images fill the width. When the preferred fit would spill over
/// the other axis the image is shrunk to fit it instead.
pub fn place(raw_width: u32, raw_height: u32, rotation: Rotation, viewport: Viewport) -> Placement {
    let (img_w, img_h) = if rotation.swaps_axes() {
        (raw_height, raw_width)
    } else {
        (raw_width, raw_height)
    };

    let iw = img_w.max(1) as f64;
    let ih = img_h.max(1) as f64;
    let vw = viewport.width.max(1) as f64;
    let vh = viewport.height.max(1) as f64;

    let by_height = vh / ih;
    let by_width = vw / iw;
    let portrait = raw_height >= raw_width || rotation.swaps_axes();
    let preferred = if portrait { by_height } else { by_width };
    let scale = preferred.min(by_height).min(by_width);

    let width = ((iw * scale).round() as u32).clamp(1, viewport.width.max(1));
    let height = ((ih * scale).round() as u32).clamp(1, viewport.height.max(1));
    let (x, y) = center_offset(width, height, viewport);

    Placement {
        x,
        y,
        width,
        height,
    }
}

pub fn center_offset(inner_w: u32, inner_h: u32, outer: Viewport) -> (u32, u32) {
    (
        outer.width.saturating_sub(inner_w) / 2,
        outer.height.saturating_sub(inner_h) / 2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_HD: Viewport = Viewport {
        width: 1920,
        height: 1080,
    };

    #[test]
    fn test_portrait_fills_height_with_side_padding() {
        let placement = place(1000, 2000, Rotation::None, FULL_HD);
        assert_eq!(
            placement,
            Placement {
                x: 690,
                y: 0,
                width: 540,
                height: 1080
            }
        );
    }

    #[test]
    fn test_square_counts_as_portrait() {
        let placement = place(500, 500, Rotation::None, FULL_HD);
        assert_eq!((placement.width, placement.height), (1080, 1080));
        assert_eq!(placement.x, 420);
    }

    #[test]
    fn test_landscape_fills_width() {
        let placement = place(3840, 2160, Rotation::None, FULL_HD);
        assert_eq!(
            placement,
            Placement {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080
            }
        );
    }

    #[test]
    fn test_wide_landscape_is_centred_vertically() {
        let placement = place(4000, 1000, Rotation::None, FULL_HD);
        assert_eq!((placement.width, placement.height), (1920, 480));
        assert_eq!((placement.x, placement.y), (0, 300));
    }

    #[test]
    fn test_four_by_three_on_wide_screen_is_not_cropped() {
        // Width fit would make it 1440 tall
        let placement = place(1600, 1200, Rotation::None, FULL_HD);
        assert_eq!((placement.width, placement.height), (1440, 1080));
        assert_eq!((placement.x, placement.y), (240, 0));
    }

    #[test]
    fn test_rotated_landscape_is_treated_as_portrait() {
        let placement = place(2000, 1000, Rotation::Clockwise90, FULL_HD);
        assert_eq!((placement.width, placement.height), (540, 1080));
        assert_eq!(placement.x, 690);

        let placement = place(2000, 1000, Rotation::Clockwise270, FULL_HD);
        assert_eq!((placement.width, placement.height), (540, 1080));
    }

    #[test]
    fn test_portrait_on_portrait_screen_shrinks_to_width() {
        let placement = place(1000, 1200, Rotation::None, Viewport::new(1080, 1920));
        assert_eq!((placement.width, placement.height), (1080, 1296));
        assert_eq!((placement.x, placement.y), (0, 312));
    }

    #[test]
    fn test_degenerate_sizes_do_not_panic() {
        let placement = place(0, 0, Rotation::None, Viewport::new(0, 0));
        assert_eq!((placement.width, placement.height), (1, 1));
    }
}
