use super::{ElementFlags, ElementId, ElementTree};

/// One of the three child orderings a parent maintains.
///
/// `All` is the z-order and always a superset of the other two, which are
/// subsequences filtered by the child's flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChildOrder {
    All,
    /// Children taking part in hit testing (`IGNORE` unset).
    Inject,
    /// Children exempt from clipping (`NOCLIP` set).
    NoClip,
}

impl ChildOrder {
    pub const EACH: [ChildOrder; 3] = [ChildOrder::All, ChildOrder::Inject, ChildOrder::NoClip];

    pub(crate) const fn index(self) -> usize {
        match self {
            ChildOrder::All => 0,
            ChildOrder::Inject => 1,
            ChildOrder::NoClip => 2,
        }
    }

    /// Whether a child with `flags` belongs in this ordering.
    pub fn includes(self, flags: ElementFlags) -> bool {
        match self {
            ChildOrder::All => true,
            ChildOrder::Inject => !flags.contains(ElementFlags::IGNORE),
            ChildOrder::NoClip => flags.contains(ElementFlags::NOCLIP),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Link {
    pub(crate) prev: Option<ElementId>,
    pub(crate) next: Option<ElementId>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) first: Option<ElementId>,
    pub(crate) last: Option<ElementId>,
}

impl ElementTree {
    /// Splices `id` into every ordering its flags select, before `next` in the
    /// full ordering (or at the end). The parent must already be assigned.
    pub(crate) fn link(&mut self, id: ElementId, next: Option<ElementId>) {
        let Some(parent) = self.parent(id) else {
            debug_assert!(false, "linking an element without a parent");
            return;
        };
        debug_assert!(next.is_none_or(|next| self.parent(next) == Some(parent)));

        let prev = match next {
            Some(next) => self.link_of(next, ChildOrder::All).prev,
            None => self.span_of(parent, ChildOrder::All).last,
        };
        self.splice(parent, id, ChildOrder::All, prev, next);

        let flags = self.flags(id);
        for order in [ChildOrder::Inject, ChildOrder::NoClip] {
            if order.includes(flags) {
                self.link_filtered(parent, id, order);
            }
        }
    }

    /// Inverse of [`ElementTree::link`]; uses the element's current flags to
    /// decide which orderings it is in.
    pub(crate) fn unlink(&mut self, id: ElementId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let flags = self.flags(id);
        for order in ChildOrder::EACH {
            if order.includes(flags) {
                self.cut(parent, id, order);
            }
        }
    }

    /// Re-evaluates membership in the filtered orderings after a flag change
    /// without touching the element's position in the full ordering.
    pub(crate) fn refresh_membership(&mut self, id: ElementId, old: ElementFlags) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let new = self.flags(id);
        for order in [ChildOrder::Inject, ChildOrder::NoClip] {
            match (order.includes(old), order.includes(new)) {
                (true, false) => self.cut(parent, id, order),
                (false, true) => self.link_filtered(parent, id, order),
                _ => {}
            }
        }
    }

    fn link_filtered(&mut self, parent: ElementId, id: ElementId, order: ChildOrder) {
        let prev = self.find_filtered(id, order, |link| link.prev);
        let next = self.find_filtered(id, order, |link| link.next);
        self.splice(parent, id, order, prev, next);
    }

    /// Walks the full ordering from `id` until a sibling belonging to `order`.
    fn find_filtered(
        &self,
        id: ElementId,
        order: ChildOrder,
        step: impl Fn(&Link) -> Option<ElementId>,
    ) -> Option<ElementId> {
        let mut cur = step(&self.link_of(id, ChildOrder::All));
        while let Some(sibling) = cur {
            if order.includes(self.flags(sibling)) {
                return Some(sibling);
            }
            cur = step(&self.link_of(sibling, ChildOrder::All));
        }
        None
    }

    fn splice(
        &mut self,
        parent: ElementId,
        id: ElementId,
        order: ChildOrder,
        prev: Option<ElementId>,
        next: Option<ElementId>,
    ) {
        let i = order.index();
        if let Some(element) = self.get_mut(id) {
            element.links[i] = Link { prev, next };
        }
        match prev {
            Some(prev) => self.link_mut(prev, order).next = Some(id),
            None => self.span_mut(parent, order).first = Some(id),
        }
        match next {
            Some(next) => self.link_mut(next, order).prev = Some(id),
            None => self.span_mut(parent, order).last = Some(id),
        }
    }

    fn cut(&mut self, parent: ElementId, id: ElementId, order: ChildOrder) {
        let link = self.link_of(id, order);
        match link.prev {
            Some(prev) => self.link_mut(prev, order).next = link.next,
            None => self.span_mut(parent, order).first = link.next,
        }
        match link.next {
            Some(next) => self.link_mut(next, order).prev = link.prev,
            None => self.span_mut(parent, order).last = link.prev,
        }
        *self.link_mut(id, order) = Link::default();
    }

    fn flags(&self, id: ElementId) -> ElementFlags {
        self.get(id).map(|e| e.flags).unwrap_or_default()
    }

    fn link_of(&self, id: ElementId, order: ChildOrder) -> Link {
        self.get(id)
            .map(|e| e.links[order.index()])
            .unwrap_or_default()
    }

    fn span_of(&self, id: ElementId, order: ChildOrder) -> Span {
        self.get(id)
            .map(|e| e.children[order.index()])
            .unwrap_or_default()
    }

    fn link_mut(&mut self, id: ElementId, order: ChildOrder) -> &mut Link {
        &mut self.elements[id].links[order.index()]
    }

    fn span_mut(&mut self, id: ElementId, order: ChildOrder) -> &mut Span {
        &mut self.elements[id].children[order.index()]
    }

    /// Checks that every ordering under `parent` is a well-formed doubly linked
    /// list and that membership matches the children's flags.
    pub fn verify_orderings(&self, parent: ElementId) -> bool {
        let all: Vec<ElementId> = self.children(parent, ChildOrder::All).collect();
        if all.iter().any(|&child| self.parent(child) != Some(parent)) {
            return false;
        }
        ChildOrder::EACH.into_iter().all(|order| {
            let forward: Vec<ElementId> = self.children(parent, order).collect();
            let mut backward: Vec<ElementId> = self.children_rev(parent, order).collect();
            backward.reverse();
            let expected: Vec<ElementId> = all
                .iter()
                .copied()
                .filter(|&child| order.includes(self.flags(child)))
                .collect();
            forward == backward && forward == expected
        })
    }
}
