#![forbid(unsafe_code)]

//! Grid fit-sizing.
//!
//! Finds the single tile size shared by every non-customized tile so that the
//! whole grid fits in the container without scrolling.
//!
//! # Algorithm
//!
//! With `rows = ceil(max(n, 1) / cols)` and `avail_h = container_h - header - margin_top`:
//!
//! 1. Width-driven candidate: `w = floor((W - (cols-1)·gap) / cols)`, `h = floor(w · 9/16)`.
//! 2. Height-driven candidate: `h = floor((avail_h - (rows-1)·gap) / rows)`, `w = floor(h · 16/9)`.
//! 3. Take the height-driven candidate when `cols·w + (cols-1)·gap <= W`, otherwise
//!    the width-driven one.
//! 4. Stability: with `prevent_shrink_on_row_add`, a previous size that still fits
//!    and is at least as wide as the candidate is kept as-is.
//!
//! Only the caller-supplied column count is considered; no search over other
//! column/row splits happens here.
//!
//! # Invariants
//!
//! - The result is never negative. A zero dimension means "no space to render".
//! - Any non-stability result satisfies `cols·w + (cols-1)·gap <= W` and
//!   `rows·h + (rows-1)·gap <= avail_h` whenever both are positive.

use std::num::NonZeroUsize;

use multistream_core::debug;
use multistream_core::geometry::Size;

use crate::aspect::AspectRatio;

/// Pixels between adjacent tiles.
pub const DEFAULT_GAP: f64 = 8.0;

/// Clamp a raw column count to the `>= 1` domain accepted by the layout functions.
#[must_use]
pub fn clamp_cols(cols: usize) -> NonZeroUsize {
    NonZeroUsize::new(cols).unwrap_or(NonZeroUsize::MIN)
}

/// Rows needed to hold `num_tiles` tiles in `cols` columns (at least one).
#[must_use]
pub fn rows_for(num_tiles: usize, cols: NonZeroUsize) -> usize {
    num_tiles.max(1).div_ceil(cols.get())
}

/// Inputs for one sizing pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSizeParams {
    /// Container content-box size.
    pub container: Size,
    /// Number of tiles in the grid.
    pub num_tiles: usize,
    /// Column count.
    pub cols: NonZeroUsize,
    /// Pixels between tiles.
    pub gap: f64,
    /// Header inset subtracted from the usable height.
    pub header_height: f64,
    /// Top margin subtracted from the usable height.
    pub margin_top: f64,
    /// Target tile ratio.
    pub aspect: AspectRatio,
    /// Size currently on screen, if any.
    pub current_size: Option<Size>,
    /// Keep `current_size` when it still fits (see module docs).
    pub prevent_shrink_on_row_add: bool,
}

impl TileSizeParams {
    /// Parameters with an 8px gap, no insets, 16:9 tiles and the stability rule on.
    #[must_use]
    pub fn new(container: Size, num_tiles: usize, cols: NonZeroUsize) -> Self {
        Self {
            container,
            num_tiles,
            cols,
            gap: DEFAULT_GAP,
            header_height: 0.0,
            margin_top: 0.0,
            aspect: AspectRatio::WIDESCREEN,
            current_size: None,
            prevent_shrink_on_row_add: true,
        }
    }

    /// Set the gap between tiles.
    #[must_use]
    pub fn gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// Set the header inset.
    #[must_use]
    pub fn header_height(mut self, header_height: f64) -> Self {
        self.header_height = header_height;
        self
    }

    /// Set the top margin.
    #[must_use]
    pub fn margin_top(mut self, margin_top: f64) -> Self {
        self.margin_top = margin_top;
        self
    }

    /// Set the target aspect ratio.
    #[must_use]
    pub fn aspect(mut self, aspect: AspectRatio) -> Self {
        self.aspect = aspect;
        self
    }

    /// Set the size currently on screen.
    #[must_use]
    pub fn current_size(mut self, current_size: Option<Size>) -> Self {
        self.current_size = current_size;
        self
    }

    /// Toggle the stability rule.
    #[must_use]
    pub fn prevent_shrink_on_row_add(mut self, enabled: bool) -> Self {
        self.prevent_shrink_on_row_add = enabled;
        self
    }

    /// Usable height once insets are removed (never negative).
    #[must_use]
    pub fn available_height(&self) -> f64 {
        (self.container.height - self.header_height - self.margin_top).max(0.0)
    }
}

/// Which rule produced the tile size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingBranch {
    /// Rows fill the usable height; width follows from the ratio.
    HeightDriven,
    /// Columns fill the container width; height follows from the ratio.
    WidthDriven,
    /// The previous size still fits and was kept.
    KeptCurrent,
}

impl SizingBranch {
    /// Kebab-case name for reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeightDriven => "height-driven",
            Self::WidthDriven => "width-driven",
            Self::KeptCurrent => "kept-current",
        }
    }
}

/// Result of a sizing pass, with the intermediate figures for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSizing {
    /// Size of every non-customized tile.
    pub size: Size,
    /// Rows in the grid.
    pub rows: usize,
    /// Columns in the grid.
    pub cols: usize,
    /// Height left after header and margin.
    pub available_height: f64,
    /// How the size was chosen.
    pub branch: SizingBranch,
}

impl TileSizing {
    /// Total width of one full row of tiles including gaps.
    #[must_use]
    pub fn used_width(&self, gap: f64) -> f64 {
        span(self.cols, self.size.width, gap)
    }

    /// Total height of all rows including gaps.
    #[must_use]
    pub fn used_height(&self, gap: f64) -> f64 {
        span(self.rows, self.size.height, gap)
    }
}

#[inline]
fn span(count: usize, extent: f64, gap: f64) -> f64 {
    let count = count as f64;
    count * extent + (count - 1.0) * gap
}

/// Run the fit-sizing algorithm and report how the size was chosen.
#[must_use]
pub fn compute_tile_sizing(params: &TileSizeParams) -> TileSizing {
    let cols = params.cols.get();
    let rows = rows_for(params.num_tiles, params.cols);
    let available_height = params.available_height();
    let container_width = params.container.width;
    let gap = params.gap;

    let col_gaps = (cols as f64 - 1.0) * gap;
    let row_gaps = (rows as f64 - 1.0) * gap;

    let width_per_tile = ((container_width - col_gaps) / cols as f64).floor();
    let height_from_width = params.aspect.height_for_width(width_per_tile).floor();

    let height_per_tile = ((available_height - row_gaps) / rows as f64).floor();
    let width_from_height = params.aspect.width_for_height(height_per_tile).floor();

    let (candidate, branch) = if span(cols, width_from_height, gap) <= container_width {
        (
            Size::new(width_from_height, height_per_tile),
            SizingBranch::HeightDriven,
        )
    } else {
        (
            Size::new(width_per_tile, height_from_width),
            SizingBranch::WidthDriven,
        )
    };

    debug!(
        container_width,
        container_height = params.container.height,
        tiles = params.num_tiles,
        cols,
        rows,
        available_height,
        width_per_tile,
        height_from_width,
        height_per_tile,
        width_from_height,
        branch = ?branch,
        "tile sizing candidates"
    );

    if params.prevent_shrink_on_row_add
        && let Some(current) = params.current_size.filter(|c| c.width > 0.0)
    {
        let fits_height = span(rows, current.height, gap) <= available_height;
        let fits_width = span(cols, current.width, gap) <= container_width;
        if fits_height && fits_width && current.width >= candidate.width {
            debug!(
                width = current.width,
                height = current.height,
                "keeping current tile size"
            );
            return TileSizing {
                size: current,
                rows,
                cols,
                available_height,
                branch: SizingBranch::KeptCurrent,
            };
        }
    }

    TileSizing {
        size: Size::new(candidate.width.max(0.0), candidate.height.max(0.0)),
        rows,
        cols,
        available_height,
        branch,
    }
}

/// The tile size for one layout pass. See the module docs for the algorithm.
#[must_use]
pub fn calculate_optimal_tile_size(params: &TileSizeParams) -> Size {
    compute_tile_sizing(params).size
}
