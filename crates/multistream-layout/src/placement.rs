#![forbid(unsafe_code)]

//! Placement validation for drag and resize gestures.
//!
//! A proposed rectangle is accepted only if it has a finite, positive extent,
//! lies inside the container and overlaps no other tile. Rejection is expected
//! and recoverable: the caller keeps the tile's previous rectangle. Proposals
//! are never clamped.

use std::fmt;

use multistream_core::geometry::{Rect, Size, within_bounds};
use multistream_core::trace;

use crate::positions::TilePositions;
use crate::tile::TileId;

/// Why a proposed rectangle was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementError {
    /// The rectangle has a non-finite coordinate or a width or height that is
    /// not strictly positive.
    Degenerate { proposed: Rect },
    /// The rectangle leaves the container.
    OutOfBounds { proposed: Rect, bounds: Size },
    /// The rectangle overlaps another tile. When several tiles overlap, the
    /// smallest identity is reported.
    Overlap { other: TileId },
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degenerate { proposed } => write!(
                f,
                "rectangle ({}, {}, {}x{}) has no positive area",
                proposed.x, proposed.y, proposed.width, proposed.height
            ),
            Self::OutOfBounds { proposed, bounds } => write!(
                f,
                "rectangle ({}, {}, {}x{}) exceeds container {}x{}",
                proposed.x, proposed.y, proposed.width, proposed.height, bounds.width, bounds.height
            ),
            Self::Overlap { other } => write!(f, "rectangle overlaps tile {other}"),
        }
    }
}

impl std::error::Error for PlacementError {}

/// Check `proposed` for `target` against every other tile in `tiles`.
///
/// `tiles` should be the positions computed from the state immediately before
/// the gesture completed. The entry for `target` itself is ignored.
pub fn check_position(
    target: &str,
    proposed: &Rect,
    tiles: &TilePositions,
    bounds: Size,
) -> Result<(), PlacementError> {
    if !is_well_formed(proposed) {
        trace!(tile = target, ?proposed, "proposal is degenerate");
        return Err(PlacementError::Degenerate {
            proposed: *proposed,
        });
    }
    if !within_bounds(proposed, bounds) {
        trace!(tile = target, ?proposed, ?bounds, "proposal out of bounds");
        return Err(PlacementError::OutOfBounds {
            proposed: *proposed,
            bounds,
        });
    }
    let first_hit = tiles
        .others(target)
        .filter(|(_, rect)| proposed.overlaps(rect))
        .map(|(id, _)| id)
        .min();
    match first_hit {
        Some(other) => {
            trace!(tile = target, other = %other, ?proposed, "proposal overlaps");
            Err(PlacementError::Overlap {
                other: other.clone(),
            })
        }
        None => Ok(()),
    }
}

// Overlap and containment assume positive extents.
fn is_well_formed(rect: &Rect) -> bool {
    [rect.x, rect.y, rect.width, rect.height]
        .iter()
        .all(|v| v.is_finite())
        && rect.width > 0.0
        && rect.height > 0.0
}

/// Boolean form of [`check_position`].
#[must_use]
pub fn is_valid_position(
    target: &str,
    proposed: &Rect,
    tiles: &TilePositions,
    bounds: Size,
) -> bool {
    check_position(target, proposed, tiles, bounds).is_ok()
}

/// Every pair of overlapping tiles, each pair ordered and the list sorted.
#[must_use]
pub fn find_conflicts(tiles: &TilePositions) -> Vec<(TileId, TileId)> {
    let entries = tiles.sorted();
    let mut conflicts = Vec::new();
    for (i, (a_id, a)) in entries.iter().enumerate() {
        for (b_id, b) in &entries[i + 1..] {
            if a.overlaps(b) {
                conflicts.push(((*a_id).clone(), (*b_id).clone()));
            }
        }
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Size = Size::new(1600.0, 900.0);

    fn tiles(entries: &[(&str, Rect)]) -> TilePositions {
        entries
            .iter()
            .map(|(id, rect)| (TileId::from(*id), *rect))
            .collect()
    }

    #[test]
    fn overlapping_move_is_rejected() {
        let all = tiles(&[
            ("A", Rect::new(0.0, 0.0, 400.0, 225.0)),
            ("B", Rect::new(800.0, 0.0, 400.0, 225.0)),
        ]);
        let proposed = Rect::new(380.0, 0.0, 400.0, 225.0);
        assert!(!is_valid_position("B", &proposed, &all, BOUNDS));
        assert_eq!(
            check_position("B", &proposed, &all, BOUNDS),
            Err(PlacementError::Overlap {
                other: TileId::from("A")
            })
        );
    }

    #[test]
    fn clear_move_is_accepted() {
        let all = tiles(&[
            ("A", Rect::new(0.0, 0.0, 400.0, 225.0)),
            ("B", Rect::new(800.0, 0.0, 400.0, 225.0)),
        ]);
        let proposed = Rect::new(450.0, 0.0, 400.0, 225.0);
        assert!(is_valid_position("B", &proposed, &all, BOUNDS));
    }

    #[test]
    fn touching_neighbour_is_accepted() {
        let all = tiles(&[("A", Rect::new(0.0, 0.0, 400.0, 225.0))]);
        assert!(is_valid_position("B", &Rect::new(400.0, 0.0, 400.0, 225.0), &all, BOUNDS));
    }

    #[test]
    fn own_previous_rect_is_ignored() {
        let all = tiles(&[("A", Rect::new(0.0, 0.0, 400.0, 225.0))]);
        assert!(is_valid_position("A", &Rect::new(10.0, 10.0, 400.0, 225.0), &all, BOUNDS));
    }

    #[test]
    fn out_of_bounds_is_rejected_before_overlap() {
        let all = tiles(&[("A", Rect::new(0.0, 0.0, 400.0, 225.0))]);
        let proposed = Rect::new(-10.0, 0.0, 400.0, 225.0);
        let err = check_position("B", &proposed, &all, BOUNDS).unwrap_err();
        assert!(matches!(err, PlacementError::OutOfBounds { .. }));
        assert!(err.to_string().contains("1600x900"));

        let past_right = Rect::new(1300.0, 0.0, 400.0, 225.0);
        assert!(!is_valid_position("B", &past_right, &all, BOUNDS));
    }

    #[test]
    fn non_positive_extent_is_rejected() {
        let all = tiles(&[("A", Rect::new(0.0, 0.0, 400.0, 225.0))]);

        // Negative width would otherwise slip past both bounds and overlap checks.
        let inverted = Rect::new(700.0, 10.0, -300.0, -169.0);
        assert_eq!(
            check_position("B", &inverted, &all, BOUNDS),
            Err(PlacementError::Degenerate { proposed: inverted })
        );
        assert!(!is_valid_position("B", &Rect::new(500.0, 0.0, 0.0, 0.0), &all, BOUNDS));
        assert!(!is_valid_position("B", &Rect::new(500.0, 0.0, 400.0, 0.0), &all, BOUNDS));
        assert!(!is_valid_position(
            "B",
            &Rect::new(f64::NAN, 0.0, 400.0, 225.0),
            &all,
            BOUNDS
        ));
        let err = check_position("B", &inverted, &all, BOUNDS).unwrap_err();
        assert!(err.to_string().contains("no positive area"));
    }

    #[test]
    fn smallest_overlapping_id_is_reported() {
        let all = tiles(&[
            ("zeta", Rect::new(0.0, 0.0, 400.0, 225.0)),
            ("alpha", Rect::new(300.0, 0.0, 400.0, 225.0)),
        ]);
        let err = check_position("new", &Rect::new(100.0, 100.0, 400.0, 225.0), &all, BOUNDS)
            .unwrap_err();
        assert_eq!(err.to_string(), "rectangle overlaps tile alpha");
    }

    #[test]
    fn conflicts_are_listed_once_per_pair() {
        let all = tiles(&[
            ("a", Rect::new(0.0, 0.0, 400.0, 225.0)),
            ("b", Rect::new(200.0, 0.0, 400.0, 225.0)),
            ("c", Rect::new(400.0, 0.0, 400.0, 225.0)),
            ("d", Rect::new(0.0, 500.0, 400.0, 225.0)),
        ]);
        assert_eq!(
            find_conflicts(&all),
            vec![
                (TileId::from("a"), TileId::from("b")),
                (TileId::from("b"), TileId::from("c")),
            ]
        );
    }
}
