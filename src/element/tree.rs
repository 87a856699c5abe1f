use super::{ChildOrder, Element, ElementFlags, ElementId};
use crate::geometry::{self, AbsRect};
use slotmap::SlotMap;

/// Arena holding every live element.
#[derive(Debug, Default)]
pub struct ElementTree {
    pub(super) elements: SlotMap<ElementId, Element>,
}

impl ElementTree {
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub(crate) fn insert(&mut self, element: Element) -> ElementId {
        self.elements.insert(element)
    }

    pub(crate) fn remove(&mut self, id: ElementId) -> Option<Element> {
        self.elements.remove(id)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(|e| e.parent)
    }

    /// Walks from `id`'s parent up to the root.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.parent(id), |&cur| self.parent(cur))
    }

    /// True when `ancestor` is `id` or one of its ancestors.
    pub fn is_within(&self, id: ElementId, ancestor: ElementId) -> bool {
        id == ancestor || self.ancestors(id).any(|cur| cur == ancestor)
    }

    pub fn children(&self, parent: ElementId, order: ChildOrder) -> Children<'_> {
        Children {
            tree: self,
            order,
            cur: self.get(parent).and_then(|e| e.first_child(order)),
            reverse: false,
        }
    }

    pub fn children_rev(&self, parent: ElementId, order: ChildOrder) -> Children<'_> {
        Children {
            tree: self,
            order,
            cur: self.get(parent).and_then(|e| e.last_child(order)),
            reverse: true,
        }
    }

    pub fn next_sibling(&self, id: ElementId, order: ChildOrder) -> Option<ElementId> {
        self.get(id).and_then(|e| e.next_sibling(order))
    }

    pub fn prev_sibling(&self, id: ElementId, order: ChildOrder) -> Option<ElementId> {
        self.get(id).and_then(|e| e.prev_sibling(order))
    }

    /// Outer rectangle resolved through the whole parent chain. A parentless
    /// element uses its absolute coordinates as-is.
    pub fn resolve_outer(&self, id: ElementId) -> AbsRect {
        let Some(element) = self.get(id) else {
            return AbsRect::ZERO;
        };
        let Some(parent) = element.parent.and_then(|p| self.get(p).map(|e| (p, e))) else {
            let area = &element.geometry.transform.area;
            return AbsRect::new(area.left.abs, area.top.abs, area.right.abs, area.bottom.abs);
        };
        let last = self.resolve_rect(parent.0);
        let padding = (!element.flags.contains(ElementFlags::BACKGROUND))
            .then_some(&parent.1.geometry.padding);
        geometry::resolve_outer(&element.geometry, element.flags, &last, padding)
    }

    /// Standard rectangle (outer minus margin) through the whole chain.
    pub fn resolve_rect(&self, id: ElementId) -> AbsRect {
        let margin = self.get(id).map(|e| e.geometry.margin).unwrap_or_default();
        self.resolve_outer(id).inset(&margin)
    }

    /// Content rectangle (standard minus padding) through the whole chain.
    pub fn resolve_inner(&self, id: ElementId) -> AbsRect {
        let padding = self.get(id).map(|e| e.geometry.padding).unwrap_or_default();
        self.resolve_rect(id).inset(&padding)
    }

    /// Standard rectangle against an already-resolved parent rectangle. The
    /// parent's padding is subtracted unless the element is a background.
    pub fn resolve_rect_in(&self, id: ElementId, last: &AbsRect) -> AbsRect {
        let Some(element) = self.get(id) else {
            return AbsRect::ZERO;
        };
        let padding = element
            .parent
            .filter(|_| !element.flags.contains(ElementFlags::BACKGROUND))
            .and_then(|p| self.get(p))
            .map(|p| &p.geometry.padding);
        geometry::resolve_standard(&element.geometry, element.flags, last, padding)
    }

    /// Standard rectangle grown to cover every direct no-clip child.
    pub fn resolve_noclip(&self, id: ElementId) -> AbsRect {
        let rect = self.resolve_rect(id);
        self.children(id, ChildOrder::NoClip)
            .fold(rect, |acc, child| acc.union(&self.resolve_rect_in(child, &rect)))
    }

    /// Pointer hit test against the element's standard rectangle.
    pub fn hit(&self, id: ElementId, x: f32, y: f32) -> bool {
        self.resolve_rect(id).contains(x, y)
    }

    #[cfg(test)]
    pub(crate) fn insert_detached(&mut self, kind: &str, flags: ElementFlags) -> ElementId {
        use crate::behavior::ElementBehavior;
        use std::rc::Rc;
        self.insert(Element::new(
            kind.into(),
            Rc::new(ElementBehavior),
            None,
            flags,
            Default::default(),
        ))
    }
}

/// Iterator over one ordering of a parent's children.
pub struct Children<'a> {
    tree: &'a ElementTree,
    order: ChildOrder,
    cur: Option<ElementId>,
    reverse: bool,
}

impl Iterator for Children<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        let cur = self.cur?;
        self.cur = if self.reverse {
            self.tree.prev_sibling(cur, self.order)
        } else {
            self.tree.next_sibling(cur, self.order)
        };
        Some(cur)
    }
}

#[cfg(test)]
mod tests {
    use crate::element::{ChildOrder, ElementFlags, ElementTree};
    use crate::geometry::{AbsRect, CRect};

    #[test]
    fn resolves_through_parent_chain() {
        let mut tree = ElementTree::default();
        let root = tree.insert_detached("root", ElementFlags::empty());
        tree.get_mut(root).expect("root").geometry.transform.area =
            CRect::from_abs(0.0, 0.0, 800.0, 600.0);

        let panel = tree.insert_detached("element", ElementFlags::empty());
        tree.get_mut(panel).expect("panel").geometry.transform.area = CRect::fill();
        tree.get_mut(panel).expect("panel").parent = Some(root);
        tree.link(panel, None);

        let button = tree.insert_detached("element", ElementFlags::empty());
        tree.get_mut(button).expect("button").geometry.transform.area =
            CRect::from_abs(10.0, 10.0, 110.0, 40.0);
        tree.get_mut(button).expect("button").parent = Some(panel);
        tree.link(button, None);

        assert_eq!(tree.resolve_rect(button), AbsRect::new(10.0, 10.0, 110.0, 40.0));
        assert!(tree.hit(button, 50.0, 20.0));
        assert!(tree.is_within(button, root));
        assert_eq!(tree.ancestors(button).collect::<Vec<_>>(), vec![panel, root]);
    }

    #[test]
    fn background_children_skip_parent_padding() {
        let mut tree = ElementTree::default();
        let root = tree.insert_detached("root", ElementFlags::empty());
        {
            let root = tree.get_mut(root).expect("root");
            root.geometry.transform.area = CRect::from_abs(0.0, 0.0, 100.0, 100.0);
            root.geometry.padding = AbsRect::new(10.0, 10.0, 10.0, 10.0);
        }
        let fg = tree.insert_detached("element", ElementFlags::empty());
        let bg = tree.insert_detached("element", ElementFlags::BACKGROUND);
        for id in [fg, bg] {
            let element = tree.get_mut(id).expect("child");
            element.geometry.transform.area = CRect::fill();
            element.parent = Some(root);
            tree.link(id, None);
        }
        assert_eq!(tree.resolve_rect(fg), AbsRect::new(10.0, 10.0, 90.0, 90.0));
        assert_eq!(tree.resolve_rect(bg), AbsRect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(tree.children_rev(root, ChildOrder::All).collect::<Vec<_>>(), vec![bg, fg]);
    }

    #[test]
    fn noclip_rect_covers_escaping_children() {
        let mut tree = ElementTree::default();
        let root = tree.insert_detached("root", ElementFlags::empty());
        tree.get_mut(root).expect("root").geometry.transform.area =
            CRect::from_abs(0.0, 0.0, 100.0, 100.0);
        let popup = tree.insert_detached("element", ElementFlags::NOCLIP);
        tree.get_mut(popup).expect("popup").geometry.transform.area =
            CRect::from_abs(50.0, 80.0, 150.0, 200.0);
        tree.get_mut(popup).expect("popup").parent = Some(root);
        tree.link(popup, None);
        assert_eq!(tree.resolve_noclip(root), AbsRect::new(0.0, 0.0, 150.0, 200.0));
    }
}
