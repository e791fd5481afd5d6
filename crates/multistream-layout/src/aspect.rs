#![forbid(unsafe_code)]

//! Aspect-ratio enforcement.
//!
//! Resize handles report sizes with a little quantization noise. Snapping the
//! height on every event would make tiles jitter, so the enforcer only
//! corrects drift larger than [`ASPECT_TOLERANCE_PX`].

use serde::{Deserialize, Serialize};

use multistream_core::geometry::Rect;

/// Height drift (in pixels) tolerated before the enforcer snaps a rectangle.
pub const ASPECT_TOLERANCE_PX: f64 = 2.0;

/// A width:height ratio such as 16:9.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: f64,
    pub height: f64,
}

impl AspectRatio {
    /// 16:9, the ratio of every supported embed.
    pub const WIDESCREEN: Self = Self {
        width: 16.0,
        height: 9.0,
    };

    /// Create a ratio. Both terms must be finite and positive.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        (valid(width) && valid(height)).then_some(Self { width, height })
    }

    /// The ratio as a single number (`width / height`).
    #[inline]
    pub fn value(&self) -> f64 {
        self.width / self.height
    }

    /// Unrounded height matching `width`.
    #[inline]
    pub fn height_for_width(&self, width: f64) -> f64 {
        width * self.height / self.width
    }

    /// Unrounded width matching `height`.
    #[inline]
    pub fn width_for_height(&self, height: f64) -> f64 {
        height * self.width / self.height
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::WIDESCREEN
    }
}

/// Snap `rect.height` to `round(rect.width / ratio)` when it drifts by more than
/// [`ASPECT_TOLERANCE_PX`]. Position and width are never touched.
#[must_use]
pub fn enforce_aspect_ratio(rect: Rect, ratio: AspectRatio) -> Rect {
    enforce_aspect_ratio_with_tolerance(rect, ratio, ASPECT_TOLERANCE_PX)
}

/// [`enforce_aspect_ratio`] with an explicit tolerance.
#[must_use]
pub fn enforce_aspect_ratio_with_tolerance(
    rect: Rect,
    ratio: AspectRatio,
    tolerance: f64,
) -> Rect {
    let expected = (rect.width / ratio.value()).round();
    if (rect.height - expected).abs() > tolerance {
        Rect { height: expected, ..rect }
    } else {
        rect
    }
}
