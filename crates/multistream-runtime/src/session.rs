#![forbid(unsafe_code)]

//! The explicit layout context.
//!
//! [`LayoutSession`] owns the mutable state of one viewer: the active streams,
//! the user's order, the column count, the cached tile size, the custom layout
//! of the active stream set and the store it persists to. The layout functions
//! themselves stay pure; the session threads this state into every call and
//! sequences each pass (size first, then positions).
//!
//! # Triggers
//!
//! | Call | Effect |
//! |------|--------|
//! | [`observe_container`](LayoutSession::observe_container) | recompute tile size |
//! | [`set_cols`](LayoutSession::set_cols) | drop the cached size, recompute |
//! | [`set_streams`](LayoutSession::set_streams) | switch custom layout if the set changed, recompute |
//! | [`handle_resize_stop`](LayoutSession::handle_resize_stop) / [`handle_drag_stop`](LayoutSession::handle_drag_stop) | validate, merge, auto-save |
//! | [`reset_layout`](LayoutSession::reset_layout) | clear the custom layout and its stored entry |

use std::fmt;
use std::num::NonZeroUsize;

use multistream_core::geometry::{Rect, Sides, Size};
use multistream_layout::{
    CustomLayout, PlacementError, Stream, StreamSetSignature, TileId, TilePositions, TileSizing,
    calculate_tile_positions, check_position, clamp_cols, compute_tile_sizing,
    enforce_aspect_ratio_with_tolerance, find_conflicts, reorder, resolve_order,
};

use crate::config::LayoutConfig;
use crate::state_persistence::{CustomLayoutStore, StorageResult};

/// Measured size of the layout container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerMetrics {
    /// Client size (content plus padding).
    pub client: Size,
    /// Container padding.
    pub padding: Sides,
}

impl ContainerMetrics {
    #[must_use]
    pub const fn new(client: Size, padding: Sides) -> Self {
        Self { client, padding }
    }

    /// Metrics for a container without padding.
    #[must_use]
    pub const fn unpadded(client: Size) -> Self {
        Self {
            client,
            padding: Sides::new(0.0, 0.0, 0.0, 0.0),
        }
    }

    /// The content box: client size minus padding. Used both for sizing and
    /// as validation bounds.
    #[must_use]
    pub fn content_box(&self) -> Size {
        self.client.inner(self.padding)
    }
}

/// Why a gesture was not applied. Always recoverable: the tile keeps its
/// previous rectangle.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureError {
    /// The gesture names a tile that is not active.
    UnknownTile(TileId),
    /// The proposed rectangle failed validation.
    Rejected {
        tile: TileId,
        reason: PlacementError,
    },
}

impl fmt::Display for GestureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTile(id) => write!(f, "unknown tile {id}"),
            Self::Rejected { tile, reason } => write!(f, "move of {tile} rejected: {reason}"),
        }
    }
}

impl std::error::Error for GestureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownTile(_) => None,
            Self::Rejected { reason, .. } => Some(reason),
        }
    }
}

/// Mutable layout state for one viewer.
pub struct LayoutSession {
    config: LayoutConfig,
    store: CustomLayoutStore,
    streams: Vec<Stream>,
    signature: StreamSetSignature,
    layout_order: Vec<TileId>,
    cols: NonZeroUsize,
    container: ContainerMetrics,
    tile_size: Size,
    last_sizing: Option<TileSizing>,
    custom: CustomLayout,
    autosave: bool,
}

impl LayoutSession {
    /// A session with no streams, persisting to `store`.
    #[must_use]
    pub fn new(config: LayoutConfig, store: CustomLayoutStore) -> Self {
        let cols = clamp_cols(config.initial_cols);
        Self {
            config,
            store,
            streams: Vec::new(),
            signature: StreamSetSignature::from_streams(std::iter::empty::<&Stream>()),
            layout_order: Vec::new(),
            cols,
            container: ContainerMetrics::default(),
            tile_size: Size::ZERO,
            last_sizing: None,
            custom: CustomLayout::new(),
            autosave: true,
        }
    }

    /// A session with ephemeral storage.
    #[must_use]
    pub fn in_memory(config: LayoutConfig) -> Self {
        Self::new(config, CustomLayoutStore::in_memory())
    }

    // ── Inputs ──────────────────────────────────────────────────────────

    /// Record a new container measurement and recompute the tile size.
    pub fn observe_container(&mut self, metrics: ContainerMetrics) {
        if self.container == metrics {
            return;
        }
        self.container = metrics;
        self.recompute_tile_size(false);
    }

    /// Change the column count (clamped to at least 1).
    ///
    /// A real change discards the cached tile size so the next size is
    /// computed fresh for the new grid.
    pub fn set_cols(&mut self, cols: usize) {
        let cols = clamp_cols(cols);
        if cols == self.cols {
            return;
        }
        tracing::debug!(from = self.cols.get(), to = cols.get(), "column count changed");
        self.cols = cols;
        self.recompute_tile_size(true);
    }

    /// Replace the active streams.
    ///
    /// When the stream set (platform and channel pairs) changes, the custom
    /// layout of the new set is loaded from the store.
    pub fn set_streams(&mut self, streams: Vec<Stream>) {
        let signature = StreamSetSignature::from_streams(&streams);
        let count_changed = streams.len() != self.streams.len();
        self.streams = streams;
        if signature != self.signature {
            self.custom = self.store.load(&self.streams);
            tracing::debug!(
                signature = %signature,
                customized = self.custom.len(),
                "stream set changed"
            );
            self.signature = signature;
        } else {
            let active = &self.streams;
            self.custom
                .retain_active(|id| active.iter().any(|s| &s.id == id));
        }
        if count_changed {
            self.recompute_tile_size(false);
        }
    }

    /// Replace the user's preferred order.
    pub fn set_layout_order(&mut self, order: Vec<TileId>) {
        self.layout_order = order;
    }

    /// Move tile `from` to the slot held by `to`. Unknown ids are ignored.
    pub fn reorder(&mut self, from: &str, to: &str) -> bool {
        let mut order = self.order();
        if !reorder(&mut order, from, to) {
            return false;
        }
        self.layout_order = order;
        true
    }

    // ── Outputs ─────────────────────────────────────────────────────────

    /// Canonical render order of the active streams.
    #[must_use]
    pub fn order(&self) -> Vec<TileId> {
        let ids: Vec<TileId> = self.streams.iter().map(|s| s.id.clone()).collect();
        resolve_order(&ids, &self.layout_order)
    }

    /// Rectangle of every active tile for the current pass.
    #[must_use]
    pub fn positions(&self) -> TilePositions {
        calculate_tile_positions(
            &self.order(),
            &self.custom,
            self.tile_size,
            self.cols,
            self.config.gap,
        )
    }

    /// Validation bounds: the container content box.
    #[must_use]
    pub fn bounds(&self) -> Size {
        self.container.content_box()
    }

    /// Customized tiles that no longer fit: outside the bounds or overlapping
    /// another tile. Sorted by identity.
    ///
    /// Stored rectangles are never rewritten on read, so a container resize
    /// can leave customizations in these states.
    #[must_use]
    pub fn stale_tiles(&self) -> Vec<TileId> {
        let positions = self.positions();
        let bounds = self.bounds();
        let mut stale: Vec<TileId> = self
            .custom
            .iter()
            .filter(|(id, _)| positions.contains(id.as_str()))
            .filter(|(_, rect)| !rect.within(bounds))
            .map(|(id, _)| id.clone())
            .collect();
        for (a, b) in find_conflicts(&positions) {
            for id in [a, b] {
                if self.custom.contains(id.as_str()) && !stale.contains(&id) {
                    stale.push(id);
                }
            }
        }
        stale.sort_unstable();
        stale
    }

    /// Whether freeform editing is active (at least one stream).
    #[must_use]
    pub fn is_custom_mode(&self) -> bool {
        !self.streams.is_empty()
    }

    // ── Gestures ────────────────────────────────────────────────────────

    /// Complete a resize of `id` to `proposed`.
    ///
    /// The height is snapped to the aspect ratio first, then the result is
    /// validated against every other tile. On success the rectangle is merged
    /// into the custom layout, persisted and returned.
    pub fn handle_resize_stop(&mut self, id: &str, proposed: Rect) -> Result<Rect, GestureError> {
        let positions = self.positions();
        if !positions.contains(id) {
            return Err(GestureError::UnknownTile(TileId::from(id)));
        }
        let rect = enforce_aspect_ratio_with_tolerance(
            proposed,
            self.config.aspect_ratio,
            self.config.aspect_tolerance,
        );
        self.commit(id, rect, &positions, "resize")
    }

    /// Complete a drag of `id` to `(x, y)`. The tile keeps its current size.
    pub fn handle_drag_stop(&mut self, id: &str, x: f64, y: f64) -> Result<Rect, GestureError> {
        let positions = self.positions();
        let Some(current) = positions.get(id) else {
            return Err(GestureError::UnknownTile(TileId::from(id)));
        };
        let rect = current.with_origin(x, y);
        self.commit(id, rect, &positions, "drag")
    }

    /// Drop every customization of the active stream set, in memory and in
    /// the store.
    pub fn reset_layout(&mut self) {
        self.custom.clear();
        if let Err(error) = self.store.clear(&self.streams) {
            tracing::warn!(error = %error, "failed to clear stored layout");
        }
    }

    /// Turn saving after each accepted gesture on or off (on by default).
    ///
    /// With auto-save off, call [`persist`](Self::persist) to write the
    /// mapping and see whether the write succeeded.
    pub fn set_autosave(&mut self, enabled: bool) {
        self.autosave = enabled;
    }

    /// Save the custom layout of the active stream set. An empty mapping is
    /// not written.
    pub fn persist(&self) -> StorageResult<()> {
        if self.custom.is_empty() {
            return Ok(());
        }
        self.store.save(&self.streams, &self.custom)
    }

    // ── Accessors ───────────────────────────────────────────────────────

    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    #[must_use]
    pub fn cols(&self) -> NonZeroUsize {
        self.cols
    }

    /// Size of every non-customized tile.
    #[must_use]
    pub fn tile_size(&self) -> Size {
        self.tile_size
    }

    /// Details of the last sizing pass, if one ran.
    #[must_use]
    pub fn last_sizing(&self) -> Option<&TileSizing> {
        self.last_sizing.as_ref()
    }

    #[must_use]
    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    #[must_use]
    pub fn custom_layout(&self) -> &CustomLayout {
        &self.custom
    }

    #[must_use]
    pub fn container(&self) -> ContainerMetrics {
        self.container
    }

    #[must_use]
    pub fn store(&self) -> &CustomLayoutStore {
        &self.store
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn recompute_tile_size(&mut self, cols_changed: bool) {
        let current = (!cols_changed).then_some(self.tile_size);
        let params = self
            .config
            .tile_size_params(self.bounds(), self.streams.len(), self.cols.get())
            .current_size(current);
        let sizing = compute_tile_sizing(&params);
        if sizing.size != self.tile_size {
            tracing::debug!(
                width = sizing.size.width,
                height = sizing.size.height,
                rows = sizing.rows,
                cols = sizing.cols,
                branch = ?sizing.branch,
                "tile size changed"
            );
            self.tile_size = sizing.size;
        }
        self.last_sizing = Some(sizing);
    }

    fn commit(
        &mut self,
        id: &str,
        rect: Rect,
        positions: &TilePositions,
        gesture: &'static str,
    ) -> Result<Rect, GestureError> {
        if let Err(reason) = check_position(id, &rect, positions, self.bounds()) {
            tracing::warn!(
                tile = %id,
                gesture,
                reason = %reason,
                "gesture rejected, keeping previous rect"
            );
            return Err(GestureError::Rejected {
                tile: TileId::from(id),
                reason,
            });
        }
        self.custom.insert(TileId::from(id), rect);
        self.autosave();
        Ok(rect)
    }

    fn autosave(&self) {
        if !self.autosave {
            return;
        }
        if let Err(error) = self.persist() {
            tracing::warn!(error = %error, "failed to save custom layout, keeping it in memory");
        }
    }
}

impl fmt::Debug for LayoutSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutSession")
            .field("streams", &self.streams.len())
            .field("cols", &self.cols)
            .field("tile_size", &self.tile_size)
            .field("customized", &self.custom.len())
            .field("store", &self.store)
            .finish()
    }
}
