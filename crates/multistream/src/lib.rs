#![forbid(unsafe_code)]

//! Multistream public facade crate.
//!
//! Re-exports the layout engine and the runtime session under one name and
//! offers a prelude for day-to-day usage.
//!
//! # Example
//!
//! ```
//! use multistream::prelude::*;
//!
//! let mut session = LayoutSession::in_memory(LayoutConfig::default());
//! session.set_streams(vec![
//!     Stream::new(Platform::Twitch, "alpha", 1),
//!     Stream::new(Platform::Kick, "beta", 2),
//! ]);
//! session.observe_container(ContainerMetrics::unpadded(Size::new(1600.0, 900.0)));
//!
//! let positions = session.positions();
//! assert_eq!(positions.len(), 2);
//!
//! // A drag onto the neighbouring tile is rejected and changes nothing.
//! let err = session.handle_drag_stop("twitch:alpha:1", 100.0, 0.0).unwrap_err();
//! assert_eq!(Error::from(err).degradation(), Degradation::KeepPrevious);
//! assert_eq!(session.positions(), positions);
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use multistream_core::geometry::{Rect, Sides, Size, overlaps, within_bounds};

// --- Layout re-exports -----------------------------------------------------

pub use multistream_layout::{
    AspectRatio, CustomLayout, PlacementError, Platform, SizingBranch, Stream,
    StreamSetSignature, TileId, TilePositions, TileSizeParams, TileSizing,
    calculate_optimal_tile_size, calculate_tile_positions, check_position, compute_tile_sizing,
    enforce_aspect_ratio, is_valid_position,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "state-persistence")]
pub use multistream_runtime::FileStorage;
#[cfg(feature = "runtime")]
pub use multistream_runtime::{
    ConfigError, ContainerMetrics, CustomLayoutStore, GestureError, LayoutConfig, LayoutSession,
    MemoryStorage, StorageBackend, StorageError,
};

// --- Errors ---------------------------------------------------------------

/// How a caller should recover from an [`Error`]. No error is fatal to a
/// layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    /// Discard the proposal and keep the tile's previous rectangle.
    KeepPrevious,
    /// Continue in memory with grid placement for uncustomized tiles.
    UseDefaultGrid,
    /// Continue with the default configuration.
    UseDefaults,
}

/// Top-level error type for multistream layouts.
#[derive(Debug)]
pub enum Error {
    /// I/O failure outside the storage layer.
    Io(std::io::Error),
    /// A proposed rectangle failed validation.
    Placement(PlacementError),
    /// A gesture could not be applied.
    #[cfg(feature = "runtime")]
    Gesture(GestureError),
    /// Customizations could not be read or written.
    #[cfg(feature = "runtime")]
    Storage(StorageError),
    /// The configuration could not be loaded.
    #[cfg(feature = "runtime")]
    Config(ConfigError),
}

impl Error {
    /// Recovery policy for this error.
    #[must_use]
    pub fn degradation(&self) -> Degradation {
        match self {
            Self::Placement(_) => Degradation::KeepPrevious,
            #[cfg(feature = "runtime")]
            Self::Gesture(_) => Degradation::KeepPrevious,
            Self::Io(_) => Degradation::UseDefaultGrid,
            #[cfg(feature = "runtime")]
            Self::Storage(_) => Degradation::UseDefaultGrid,
            #[cfg(feature = "runtime")]
            Self::Config(_) => Degradation::UseDefaults,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Placement(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Gesture(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Storage(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Placement(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Gesture(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Storage(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Config(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<PlacementError> for Error {
    fn from(err: PlacementError) -> Self {
        Self::Placement(err)
    }
}

#[cfg(feature = "runtime")]
impl From<GestureError> for Error {
    fn from(err: GestureError) -> Self {
        Self::Gesture(err)
    }
}

#[cfg(feature = "runtime")]
impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

#[cfg(feature = "runtime")]
impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for multistream APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AspectRatio, CustomLayout, Degradation, Error, Platform, Rect, Result, Sides, Size,
        Stream, TileId, TilePositions,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{ContainerMetrics, LayoutConfig, LayoutSession};

    pub use crate::{core, layout};
    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use multistream_core as core;
pub use multistream_layout as layout;
#[cfg(feature = "runtime")]
pub use multistream_runtime as runtime;
