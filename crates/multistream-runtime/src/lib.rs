#![forbid(unsafe_code)]

//! Multistream Runtime
//!
//! Ties the pure layout functions to the state a viewer actually keeps.
//!
//! # Key Components
//!
//! - [`LayoutSession`] - explicit layout context: streams, order, columns, tile size, custom layout
//! - [`LayoutConfig`] - tunables, loadable from TOML or JSON
//! - [`CustomLayoutStore`] - per-stream-set persistence of customizations
//! - [`StorageBackend`] - key-value store seam ([`MemoryStorage`], `FileStorage`)
//!
//! # How it fits in the system
//! `multistream-layout` computes; this crate decides *when* to compute and
//! what to remember. Callers feed it container measurements, stream changes
//! and completed gestures, and read back tile rectangles.

pub mod config;
pub mod session;
pub mod state_persistence;

pub use config::{ConfigError, LayoutConfig};
pub use session::{ContainerMetrics, GestureError, LayoutSession};
#[cfg(feature = "state-persistence")]
pub use state_persistence::FileStorage;
pub use state_persistence::{
    CustomLayoutStore, MemoryStorage, StorageBackend, StorageError, StorageResult,
};
