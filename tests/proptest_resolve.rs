//! Property tests for rectangle resolution.
//!
//! 1. Resolution is a pure function: identical inputs give bit-identical output.
//! 2. With `0 <= min <= max` on both axes, resolved spans are never negative.
//! 3. The standard rectangle always lies within the outer one for
//!    non-negative margins.

use featherui::element::ElementFlags;
use featherui::geometry::{
    AbsRect, AbsVec, CRect, CVec, Coord, Geometry, Transform, resolve_outer, resolve_standard,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn coord() -> impl Strategy<Value = Coord> {
    (-1.0f32..2.0, -500.0f32..500.0).prop_map(|(rel, abs)| Coord::new(rel, abs))
}

fn parent() -> impl Strategy<Value = AbsRect> {
    (-1000.0f32..1000.0, -1000.0f32..1000.0, 0.0f32..2000.0, 0.0f32..2000.0)
        .prop_map(|(x, y, w, h)| AbsRect::new(x, y, x + w, y + h))
}

fn inset() -> impl Strategy<Value = AbsRect> {
    (0.0f32..20.0, 0.0f32..20.0, 0.0f32..20.0, 0.0f32..20.0)
        .prop_map(|(l, t, r, b)| AbsRect::new(l, t, r, b))
}

fn flags() -> impl Strategy<Value = ElementFlags> {
    prop_oneof![
        Just(ElementFlags::empty()),
        Just(ElementFlags::EXPANDX),
        Just(ElementFlags::EXPANDY),
        Just(ElementFlags::EXPAND),
    ]
}

/// Geometry with `0 <= min <= max` on both axes.
fn clamped_geometry() -> impl Strategy<Value = Geometry> {
    (
        (coord(), coord(), coord(), coord()),
        (coord(), coord()),
        (0.0f32..300.0, 0.0f32..300.0),
        (0.0f32..300.0, 0.0f32..300.0),
        (0.0f32..400.0, 0.0f32..400.0),
        inset(),
        inset(),
    )
        .prop_map(|((l, t, r, b), (cx, cy), (min_x, min_y), (extra_x, extra_y), (lx, ly), margin, padding)| {
            Geometry {
                transform: Transform {
                    area: CRect::new(l, t, r, b),
                    center: CVec::new(cx, cy),
                    rotation: 0.0,
                },
                margin,
                padding,
                min_dim: AbsVec::new(min_x, min_y),
                max_dim: AbsVec::new(min_x + extra_x, min_y + extra_y),
                layout_dim: AbsVec::new(lx, ly),
                scaling: AbsVec::ONE,
            }
        })
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn resolution_is_idempotent(
        geometry in clamped_geometry(),
        flags in flags(),
        last in parent(),
        padding in proptest::option::of(inset()),
    ) {
        let a = resolve_outer(&geometry, flags, &last, padding.as_ref());
        let b = resolve_outer(&geometry, flags, &last, padding.as_ref());
        prop_assert_eq!(a.left.to_bits(), b.left.to_bits());
        prop_assert_eq!(a.top.to_bits(), b.top.to_bits());
        prop_assert_eq!(a.right.to_bits(), b.right.to_bits());
        prop_assert_eq!(a.bottom.to_bits(), b.bottom.to_bits());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Non-negative spans under min/max clamps
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn clamped_spans_are_never_negative(
        geometry in clamped_geometry(),
        flags in flags(),
        last in parent(),
    ) {
        let out = resolve_outer(&geometry, flags, &last, None);
        prop_assert!(!out.is_nan(), "NaN for {:?}", geometry);
        prop_assert!(out.width() >= 0.0, "negative width {} for {:?}", out.width(), geometry);
        prop_assert!(out.height() >= 0.0, "negative height {} for {:?}", out.height(), geometry);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Margin only shrinks
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn standard_lies_within_outer(
        geometry in clamped_geometry(),
        last in parent(),
    ) {
        let outer = resolve_outer(&geometry, ElementFlags::empty(), &last, None);
        let standard = resolve_standard(&geometry, ElementFlags::empty(), &last, None);
        prop_assert!(standard.left >= outer.left);
        prop_assert!(standard.top >= outer.top);
        prop_assert!(standard.right <= outer.right);
        prop_assert!(standard.bottom <= outer.bottom);
    }
}
