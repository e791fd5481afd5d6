#![forbid(unsafe_code)]

//! Tile-position calculator.
//!
//! Maps the canonical render order to one rectangle per tile. A tile with a
//! stored customization keeps that rectangle verbatim, even when it no longer
//! fits the container. Every other tile gets the grid cell implied by its
//! index in the order.

use std::num::NonZeroUsize;

use rustc_hash::FxHashMap;

use multistream_core::debug_span;
use multistream_core::geometry::{Rect, Size};

use crate::tile::{CustomLayout, TileId};

/// Rectangles for one layout pass, indexed by tile identity.
///
/// Iteration order is unspecified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TilePositions {
    rects: FxHashMap<TileId, Rect>,
}

impl TilePositions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rectangle for `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rect> {
        self.rects.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.rects.contains_key(id)
    }

    /// Set the rectangle for `id`.
    pub fn insert(&mut self, id: TileId, rect: Rect) -> Option<Rect> {
        self.rects.insert(id, rect)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TileId, &Rect)> {
        self.rects.iter()
    }

    /// Every tile except `id`.
    pub fn others<'a>(&'a self, id: &'a str) -> impl Iterator<Item = (&'a TileId, &'a Rect)> + 'a {
        self.rects.iter().filter(move |(other, _)| other.as_str() != id)
    }

    /// Entries sorted by identity, for stable output.
    #[must_use]
    pub fn sorted(&self) -> Vec<(&TileId, &Rect)> {
        let mut entries: Vec<_> = self.rects.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl FromIterator<(TileId, Rect)> for TilePositions {
    fn from_iter<I: IntoIterator<Item = (TileId, Rect)>>(iter: I) -> Self {
        Self {
            rects: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TilePositions {
    type Item = (&'a TileId, &'a Rect);
    type IntoIter = std::collections::hash_map::Iter<'a, TileId, Rect>;

    fn into_iter(self) -> Self::IntoIter {
        self.rects.iter()
    }
}

/// Grid cell for the tile at `index` in the canonical order.
#[must_use]
pub fn grid_cell(index: usize, tile_size: Size, cols: NonZeroUsize, gap: f64) -> Rect {
    let row = (index / cols.get()) as f64;
    let col = (index % cols.get()) as f64;
    Rect::from_origin_size(
        col * (tile_size.width + gap),
        row * (tile_size.height + gap),
        tile_size,
    )
}

/// Rectangles for every tile in `order`.
///
/// Customized tiles keep their stored rectangle; the rest are laid out on the
/// grid by order index. Customized tiles still occupy their index, so
/// untouched tiles do not shift when a neighbour is customized.
#[must_use]
pub fn calculate_tile_positions(
    order: &[TileId],
    custom: &CustomLayout,
    tile_size: Size,
    cols: NonZeroUsize,
    gap: f64,
) -> TilePositions {
    let span = debug_span!(
        "tile_positions",
        tiles = order.len(),
        customized = custom.len(),
        cols = cols.get()
    );
    let _guard = span.enter();
    order
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let rect = custom
                .get(id.as_str())
                .copied()
                .unwrap_or_else(|| grid_cell(index, tile_size, cols, gap));
            (id.clone(), rect)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn ids(raw: &[&str]) -> Vec<TileId> {
        raw.iter().copied().map(TileId::from).collect()
    }

    #[test]
    fn grid_cells_follow_order_index() {
        let tile = Size::new(782.0, 440.0);
        let positions = calculate_tile_positions(
            &ids(&["a", "b", "c", "d"]),
            &CustomLayout::new(),
            tile,
            cols(2),
            8.0,
        );
        assert_eq!(positions.len(), 4);
        assert_eq!(positions.get("a"), Some(&Rect::new(0.0, 0.0, 782.0, 440.0)));
        assert_eq!(positions.get("b"), Some(&Rect::new(790.0, 0.0, 782.0, 440.0)));
        assert_eq!(positions.get("c"), Some(&Rect::new(0.0, 448.0, 782.0, 440.0)));
        assert_eq!(positions.get("d"), Some(&Rect::new(790.0, 448.0, 782.0, 440.0)));
    }

    #[test]
    fn customization_wins_and_keeps_its_slot() {
        let mut custom = CustomLayout::new();
        let stored = Rect::new(1000.0, 600.0, 320.0, 180.0);
        custom.insert(TileId::from("b"), stored);
        let tile = Size::new(400.0, 225.0);
        let positions =
            calculate_tile_positions(&ids(&["a", "b", "c"]), &custom, tile, cols(2), 8.0);
        assert_eq!(positions.get("b"), Some(&stored));
        assert_eq!(positions.get("c"), Some(&Rect::new(0.0, 233.0, 400.0, 225.0)));
    }

    #[test]
    fn out_of_bounds_customization_is_returned_verbatim() {
        let mut custom = CustomLayout::new();
        let stored = Rect::new(5000.0, 5000.0, 400.0, 225.0);
        custom.insert(TileId::from("a"), stored);
        let tile = Size::new(100.0, 56.0);
        let positions = calculate_tile_positions(&ids(&["a"]), &custom, tile, cols(1), 8.0);
        assert_eq!(positions.get("a"), Some(&stored));
    }

    #[test]
    fn customizations_for_unlisted_tiles_are_ignored() {
        let mut custom = CustomLayout::new();
        custom.insert(TileId::from("ghost"), Rect::new(0.0, 0.0, 16.0, 9.0));
        let tile = Size::new(16.0, 9.0);
        let positions = calculate_tile_positions(&ids(&["a"]), &custom, tile, cols(1), 8.0);
        assert_eq!(positions.len(), 1);
        assert!(!positions.contains("ghost"));
    }

    #[test]
    fn reordering_moves_grid_cells() {
        let tile = Size::new(100.0, 56.0);
        let none = CustomLayout::new();
        let before = calculate_tile_positions(&ids(&["a", "b"]), &none, tile, cols(2), 8.0);
        let after = calculate_tile_positions(&ids(&["b", "a"]), &none, tile, cols(2), 8.0);
        assert_eq!(before.get("a"), after.get("b"));
        assert_eq!(before.get("b"), after.get("a"));
    }

    #[test]
    fn others_excludes_target() {
        let positions: TilePositions = ids(&["a", "b", "c"])
            .into_iter()
            .map(|id| (id, Rect::default()))
            .collect();
        let mut rest: Vec<&str> = positions.others("b").map(|(id, _)| id.as_str()).collect();
        rest.sort_unstable();
        assert_eq!(rest, ["a", "c"]);
        let sorted: Vec<&str> = positions.sorted().into_iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(sorted, ["a", "b", "c"]);
    }

    #[test]
    fn empty_order_yields_empty_positions() {
        let tile = Size::new(1.0, 1.0);
        let positions = calculate_tile_positions(&[], &CustomLayout::new(), tile, cols(1), 8.0);
        assert!(positions.is_empty());
    }
}
