#![forbid(unsafe_code)]

//! Tile layout engine for the multistream viewer.
//!
//! This crate computes where every stream tile goes:
//!
//! - [`aspect`] - keep tiles at a fixed aspect ratio (16:9 by default)
//! - [`sizing`] - the single tile size that fills the container without scrolling
//! - [`positions`] - grid cells for untouched tiles, stored rectangles for customized ones
//! - [`placement`] - accept or reject a dragged/resized rectangle
//! - [`stream`] - stream identity and the order-independent stream-set signature
//! - [`order`] - canonical render order
//!
//! Everything here is a pure function of its inputs. State (current column count,
//! cached tile size, the custom layout) is owned by the caller and passed in on
//! every call.
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroUsize;
//! use multistream_layout::{
//!     CustomLayout, Size, TileId, TileSizeParams, calculate_optimal_tile_size,
//!     calculate_tile_positions,
//! };
//!
//! let cols = NonZeroUsize::new(2).unwrap();
//! let params = TileSizeParams::new(Size::new(1600.0, 900.0), 4, cols).margin_top(12.0);
//! let tile = calculate_optimal_tile_size(&params);
//! assert_eq!(tile, Size::new(782.0, 440.0));
//!
//! let order: Vec<TileId> = ["a", "b", "c", "d"].into_iter().map(TileId::from).collect();
//! let positions = calculate_tile_positions(&order, &CustomLayout::new(), tile, cols, 8.0);
//! assert_eq!(positions.get("d").unwrap().x, 790.0);
//! ```

pub mod aspect;
pub mod order;
pub mod placement;
pub mod positions;
pub mod sizing;
pub mod stream;
pub mod tile;

pub use aspect::{
    ASPECT_TOLERANCE_PX, AspectRatio, enforce_aspect_ratio, enforce_aspect_ratio_with_tolerance,
};
pub use multistream_core::geometry::{Rect, Sides, Size, overlaps, within_bounds};
pub use order::{reorder, resolve_order};
pub use placement::{PlacementError, check_position, find_conflicts, is_valid_position};
pub use positions::{TilePositions, calculate_tile_positions, grid_cell};
pub use sizing::{
    DEFAULT_GAP, SizingBranch, TileSizeParams, TileSizing, calculate_optimal_tile_size,
    clamp_cols, compute_tile_sizing, rows_for,
};
pub use stream::{
    DEFAULT_STORAGE_KEY_PREFIX, ParsePlatformError, Platform, Stream, StreamSetSignature,
};
pub use tile::{CustomLayout, TileId};
