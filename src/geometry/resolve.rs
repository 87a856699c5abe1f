use super::{AbsRect, AbsVec, Transform, lerp};
use crate::element::ElementFlags;

/// Layout-relevant state shared by elements and skin layers.
///
/// Negative `min_dim`/`max_dim` components mean "no constraint".
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry {
    pub transform: Transform,
    pub margin: AbsRect,
    pub padding: AbsRect,
    pub min_dim: AbsVec,
    pub max_dim: AbsVec,
    /// Cached auto-size result, written by the layout function.
    pub layout_dim: AbsVec,
    pub scaling: AbsVec,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            margin: AbsRect::ZERO,
            padding: AbsRect::ZERO,
            min_dim: AbsVec::new(-1.0, -1.0),
            max_dim: AbsVec::new(-1.0, -1.0),
            layout_dim: AbsVec::ZERO,
            scaling: AbsVec::ONE,
        }
    }
}

impl Geometry {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            ..Self::default()
        }
    }
}

/// Resolves the layout (outer) rectangle against the parent's resolved
/// rectangle `last`, after subtracting the parent's `padding` if given.
pub fn resolve_outer(
    geometry: &Geometry,
    flags: ElementFlags,
    last: &AbsRect,
    padding: Option<&AbsRect>,
) -> AbsRect {
    let last = match padding {
        Some(padding) => last.inset(padding),
        None => *last,
    };
    let area = &geometry.transform.area;

    let mut out = AbsRect::new(
        lerp(last.left, last.right, area.left.rel) + area.left.abs,
        lerp(last.top, last.bottom, area.top.rel) + area.top.abs,
        lerp(last.left, last.right, area.right.rel) + area.right.abs,
        lerp(last.top, last.bottom, area.bottom.rel) + area.bottom.abs,
    );

    if flags.contains(ElementFlags::EXPANDX) {
        let content = geometry.layout_dim.x
            + geometry.padding.left
            + geometry.padding.right
            + geometry.margin.left
            + geometry.margin.right;
        out.right = out.left + out.width().max(content);
    }
    if flags.contains(ElementFlags::EXPANDY) {
        let content = geometry.layout_dim.y
            + geometry.padding.top
            + geometry.padding.bottom
            + geometry.margin.top
            + geometry.margin.bottom;
        out.bottom = out.top + out.height().max(content);
    }

    if geometry.min_dim.x >= 0.0 {
        out.right = out.left + out.width().max(geometry.min_dim.x);
    }
    if geometry.min_dim.y >= 0.0 {
        out.bottom = out.top + out.height().max(geometry.min_dim.y);
    }
    if geometry.max_dim.x >= 0.0 {
        out.right = out.left + out.width().min(geometry.max_dim.x);
    }
    if geometry.max_dim.y >= 0.0 {
        out.bottom = out.top + out.height().min(geometry.max_dim.y);
    }

    let center = &geometry.transform.center;
    let cx = center.x.abs + out.width() * center.x.rel;
    let cy = center.y.abs + out.height() * center.y.rel;
    let out = out.translate(-cx, -cy);

    debug_assert!(!out.is_nan(), "rect resolution produced NaN: {out:?}");
    out
}

/// Outer rectangle with the margin applied; used for clipping and rendering.
pub fn resolve_standard(
    geometry: &Geometry,
    flags: ElementFlags,
    last: &AbsRect,
    padding: Option<&AbsRect>,
) -> AbsRect {
    resolve_outer(geometry, flags, last, padding).inset(&geometry.margin)
}

/// Standard rectangle with the padding applied; the content box for children.
pub fn resolve_inner(
    geometry: &Geometry,
    flags: ElementFlags,
    last: &AbsRect,
    padding: Option<&AbsRect>,
) -> AbsRect {
    resolve_standard(geometry, flags, last, padding).inset(&geometry.padding)
}

#[cfg(test)]
mod tests {
    use super::{Geometry, resolve_inner, resolve_outer, resolve_standard};
    use crate::element::ElementFlags;
    use crate::geometry::{AbsRect, AbsVec, CRect, CVec, Coord, Transform};

    const PARENT: AbsRect = AbsRect::new(0.0, 0.0, 800.0, 600.0);

    #[test]
    fn absolute_area_is_offset_by_parent_origin() {
        let geometry = Geometry::new(CRect::from_abs(10.0, 10.0, 110.0, 40.0).into());
        let parent = AbsRect::new(100.0, 50.0, 300.0, 300.0);
        let out = resolve_outer(&geometry, ElementFlags::empty(), &parent, None);
        assert_eq!(out, AbsRect::new(110.0, 60.0, 210.0, 90.0));
    }

    #[test]
    fn relative_area_interpolates_parent_edges() {
        let area = CRect::new(
            Coord::rel(0.25),
            Coord::rel(0.5),
            Coord::new(0.75, -10.0),
            Coord::rel(1.0),
        );
        let out = resolve_outer(&Geometry::new(area.into()), ElementFlags::empty(), &PARENT, None);
        assert_eq!(out, AbsRect::new(200.0, 300.0, 590.0, 600.0));
    }

    #[test]
    fn parent_padding_is_subtracted_first() {
        let geometry = Geometry::new(CRect::fill().into());
        let padding = AbsRect::new(5.0, 6.0, 7.0, 8.0);
        let out = resolve_outer(&geometry, ElementFlags::empty(), &PARENT, Some(&padding));
        assert_eq!(out, AbsRect::new(5.0, 6.0, 793.0, 592.0));
    }

    #[test]
    fn min_and_max_only_move_trailing_edge() {
        let mut geometry = Geometry::new(CRect::from_abs(10.0, 10.0, 20.0, 500.0).into());
        geometry.min_dim = AbsVec::new(50.0, -1.0);
        geometry.max_dim = AbsVec::new(-1.0, 100.0);
        let out = resolve_outer(&geometry, ElementFlags::empty(), &PARENT, None);
        assert_eq!(out, AbsRect::new(10.0, 10.0, 60.0, 110.0));
    }

    #[test]
    fn expand_grows_to_layout_dim_plus_padding_and_margin() {
        let mut geometry = Geometry::new(CRect::from_abs(0.0, 0.0, 10.0, 10.0).into());
        geometry.layout_dim = AbsVec::new(40.0, 5.0);
        geometry.padding = AbsRect::new(1.0, 1.0, 1.0, 1.0);
        geometry.margin = AbsRect::new(2.0, 2.0, 2.0, 2.0);
        let out = resolve_outer(&geometry, ElementFlags::EXPAND, &PARENT, None);
        assert_eq!(out, AbsRect::new(0.0, 0.0, 46.0, 11.0));

        let only_x = resolve_outer(&geometry, ElementFlags::EXPANDX, &PARENT, None);
        assert_eq!(only_x, AbsRect::new(0.0, 0.0, 46.0, 10.0));
    }

    #[test]
    fn center_translates_by_pivot() {
        let transform = Transform {
            area: CRect::from_abs(100.0, 100.0, 200.0, 150.0),
            center: CVec::new(Coord::rel(0.5), Coord::new(0.5, 5.0)),
            rotation: 0.0,
        };
        let out = resolve_outer(&Geometry::new(transform), ElementFlags::empty(), &PARENT, None);
        assert_eq!(out, AbsRect::new(50.0, 70.0, 150.0, 120.0));
    }

    #[test]
    fn standard_and_inner_apply_margin_then_padding() {
        let mut geometry = Geometry::new(CRect::from_abs(0.0, 0.0, 100.0, 100.0).into());
        geometry.margin = AbsRect::new(10.0, 10.0, 10.0, 10.0);
        geometry.padding = AbsRect::new(5.0, 5.0, 5.0, 5.0);
        let standard = resolve_standard(&geometry, ElementFlags::empty(), &PARENT, None);
        let inner = resolve_inner(&geometry, ElementFlags::empty(), &PARENT, None);
        assert_eq!(standard, AbsRect::new(10.0, 10.0, 90.0, 90.0));
        assert_eq!(inner, AbsRect::new(15.0, 15.0, 85.0, 85.0));
    }

    #[test]
    fn resolution_is_repeatable() {
        let mut geometry = Geometry::new(CRect::fill().into());
        geometry.min_dim = AbsVec::new(3.0, 3.0);
        let a = resolve_standard(&geometry, ElementFlags::EXPAND, &PARENT, None);
        let b = resolve_standard(&geometry, ElementFlags::EXPAND, &PARENT, None);
        assert_eq!(a.left.to_bits(), b.left.to_bits());
        assert_eq!(a.bottom.to_bits(), b.bottom.to_bits());
    }
}
