//! Crop selector output contract.
//!
//! The interactive selector works in *display* space: the image is shown at
//! some size that usually differs from its natural resolution, and the user
//! drags a rectangle over that rendering. What leaves the selector is a
//! [`DisplaySelection`]: the rectangle plus the size it was drawn against.
//! The raster engine scale-corrects it into a [`CropRegion`] in source pixels
//! (see [`crate::imaging::calculations::scale_selection`]).

use serde::{Deserialize, Serialize};

/// Smallest selection edge the interactive selector allows, in display pixels.
pub const MIN_SELECTION_EDGE: f64 = 50.0;

/// Share of the displayed width the initial selection covers.
const INITIAL_COVERAGE: f64 = 0.9;

/// A rectangle in source-pixel coordinates.
///
/// Valid against an image of natural size `W×H` when `x + width <= W`,
/// `y + height <= H` and both extents are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0 && self.height > 0 && self.right() <= width && self.bottom() <= height
    }
}

/// A selection as drawn on the displayed rendering of an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySelection {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Width of the rendering the selection was drawn on.
    pub displayed_width: f64,
    /// Height of the rendering the selection was drawn on.
    pub displayed_height: f64,
}

impl DisplaySelection {
    /// A selection drawn directly on the natural-size image (scale factor 1).
    pub fn at_natural_size(region: CropRegion, natural: (u32, u32)) -> Self {
        Self {
            x: region.x as f64,
            y: region.y as f64,
            width: region.width as f64,
            height: region.height as f64,
            displayed_width: natural.0 as f64,
            displayed_height: natural.1 as f64,
        }
    }

    /// A selection can only be confirmed once it encloses some area.
    pub fn is_confirmable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Whether both extents meet the selector's minimum edge.
    pub fn meets_minimum(&self) -> bool {
        self.width >= MIN_SELECTION_EDGE && self.height >= MIN_SELECTION_EDGE
    }
}

/// Aspect constraints offered by the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectPreset {
    #[default]
    Free,
    Square,
    Standard,
    Widescreen,
}

impl AspectPreset {
    pub const ALL: [AspectPreset; 4] = [
        AspectPreset::Free,
        AspectPreset::Square,
        AspectPreset::Standard,
        AspectPreset::Widescreen,
    ];

    /// `width / height`, or `None` when unconstrained.
    pub fn ratio(self) -> Option<f64> {
        match self {
            Self::Free => None,
            Self::Square => Some(1.0),
            Self::Standard => Some(4.0 / 3.0),
            Self::Widescreen => Some(16.0 / 9.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Square => "1:1",
            Self::Standard => "4:3",
            Self::Widescreen => "16:9",
        }
    }
}

/// The selection shown when the selector opens.
///
/// Centred, 90% of the displayed width. With a preset ratio the height
/// follows from it (shrinking both edges if that overflows the displayed
/// height); `Free` covers 90% of the displayed height.
pub fn initial_selection(displayed: (f64, f64), preset: AspectPreset) -> DisplaySelection {
    let (dw, dh) = displayed;
    let (width, height) = match preset.ratio() {
        None => (dw * INITIAL_COVERAGE, dh * INITIAL_COVERAGE),
        Some(ratio) => {
            let width = dw * INITIAL_COVERAGE;
            let height = width / ratio;
            if height > dh {
                (dh * ratio, dh)
            } else {
                (width, height)
            }
        }
    };

    DisplaySelection {
        x: (dw - width) / 2.0,
        y: (dh - height) / 2.0,
        width,
        height,
        displayed_width: dw,
        displayed_height: dh,
    }
}
