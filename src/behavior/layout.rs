use crate::element::{ChildOrder, ElementFlags, ElementId, ElementTree};
use crate::geometry::{self, AbsRect, AbsVec};

/// Auto-size of `id`: the extent of every non-background child's outer
/// rectangle, resolved against a zero-sized parent.
///
/// Only axes with an expand flag in `flags` take the computed value; the
/// others keep `current`. `leaving` is a child that is about to be removed
/// and must not count.
pub fn default_layout(
    tree: &ElementTree,
    id: ElementId,
    flags: ElementFlags,
    current: AbsVec,
    leaving: Option<ElementId>,
) -> AbsVec {
    let extent = tree
        .children(id, ChildOrder::All)
        .filter(|&child| Some(child) != leaving)
        .filter_map(|child| tree.get(child))
        .filter(|child| !child.flags.contains(ElementFlags::BACKGROUND))
        .map(|child| geometry::resolve_outer(&child.geometry, child.flags, &AbsRect::ZERO, None))
        .fold(AbsVec::ZERO, |acc, rect| {
            acc.max(AbsVec::new(rect.right, rect.bottom))
        });

    AbsVec::new(
        if flags.contains(ElementFlags::EXPANDX) {
            extent.x
        } else {
            current.x
        },
        if flags.contains(ElementFlags::EXPANDY) {
            extent.y
        } else {
            current.y
        },
    )
}

#[cfg(test)]
mod tests {
    use super::default_layout;
    use crate::element::{ElementFlags, ElementTree};
    use crate::geometry::{AbsVec, CRect};

    #[test]
    fn extent_covers_children_and_keeps_fixed_axes() {
        let mut tree = ElementTree::default();
        let parent = tree.insert_detached("element", ElementFlags::EXPANDX);
        for area in [
            CRect::from_abs(0.0, 0.0, 30.0, 10.0),
            CRect::from_abs(5.0, 20.0, 25.0, 80.0),
        ] {
            let child = tree.insert_detached("element", ElementFlags::empty());
            let element = tree.get_mut(child).expect("child");
            element.geometry.transform.area = area;
            element.parent = Some(parent);
            tree.link(child, None);
        }
        let dim = default_layout(&tree, parent, ElementFlags::EXPANDX, AbsVec::new(1.0, 2.0), None);
        assert_eq!(dim, AbsVec::new(30.0, 2.0));
        let both = default_layout(&tree, parent, ElementFlags::EXPAND, AbsVec::ZERO, None);
        assert_eq!(both, AbsVec::new(30.0, 80.0));
    }
}
