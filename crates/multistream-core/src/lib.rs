#![forbid(unsafe_code)]

//! Core: pixel geometry and the logging facade shared by the layout crates.

pub mod geometry;
pub mod logging;

#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, warn};

pub use geometry::{Rect, Sides, Size, overlaps, within_bounds};
