//! Property checks for the overlap and containment predicates.

use multistream_core::{Rect, Size, overlaps, within_bounds};
use proptest::prelude::*;

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (0u32..2000, 0u32..2000, 1u32..800, 1u32..800)
        .prop_map(|(x, y, w, h)| Rect::new(f64::from(x), f64::from(y), f64::from(w), f64::from(h)))
}

proptest! {
    #[test]
    fn overlap_is_symmetric(a in rect_strategy(), b in rect_strategy()) {
        prop_assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
    }

    #[test]
    fn rect_overlaps_itself(a in rect_strategy()) {
        prop_assert!(overlaps(&a, &a));
    }

    #[test]
    fn neighbours_sharing_an_edge_never_overlap(a in rect_strategy(), w in 1u32..800) {
        let right = Rect::new(a.right(), a.y, f64::from(w), a.height);
        let below = Rect::new(a.x, a.bottom(), a.width, f64::from(w));
        prop_assert!(!overlaps(&a, &right));
        prop_assert!(!overlaps(&a, &below));
    }

    #[test]
    fn overlap_agrees_with_intersection(a in rect_strategy(), b in rect_strategy()) {
        prop_assert_eq!(overlaps(&a, &b), a.intersection_opt(&b).is_some());
    }

    #[test]
    fn within_bounds_implies_inside_container(a in rect_strategy()) {
        let bounds = Size::new(1600.0, 900.0);
        if within_bounds(&a, bounds) {
            prop_assert!(a.right() <= bounds.width);
            prop_assert!(a.bottom() <= bounds.height);
        }
    }
}
