#![forbid(unsafe_code)]

//! Canonical render order.
//!
//! Grid position is derived from a tile's index in the canonical order, so
//! reordering is a data change on the order list and nothing else.

use rustc_hash::FxHashSet;

use crate::tile::TileId;

/// Merge the user's `layout_order` with the live stream list.
///
/// Ids from `layout_order` come first, in that order, skipping ids that are
/// no longer live or already listed. Live streams the order does not mention
/// are appended in `stream_ids` order.
#[must_use]
pub fn resolve_order(stream_ids: &[TileId], layout_order: &[TileId]) -> Vec<TileId> {
    let live: FxHashSet<&str> = stream_ids.iter().map(TileId::as_str).collect();
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut ordered = Vec::with_capacity(stream_ids.len());

    for id in layout_order {
        if live.contains(id.as_str()) && seen.insert(id.as_str()) {
            ordered.push(id.clone());
        }
    }
    if ordered.len() != stream_ids.len() {
        for id in stream_ids {
            if seen.insert(id.as_str()) {
                ordered.push(id.clone());
            }
        }
    }
    ordered
}

/// Move `from` to the index currently held by `to`.
///
/// Returns `false` and leaves `order` untouched when either id is missing.
pub fn reorder(order: &mut Vec<TileId>, from: &str, to: &str) -> bool {
    let (Some(from_idx), Some(to_idx)) = (
        order.iter().position(|id| id.as_str() == from),
        order.iter().position(|id| id.as_str() == to),
    ) else {
        return false;
    };
    let moved = order.remove(from_idx);
    order.insert(to_idx, moved);
    true
}
