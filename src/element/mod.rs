mod ordering;
mod tree;

pub use ordering::*;
pub use tree::*;

use crate::behavior::Behavior;
use crate::geometry::{Geometry, Transform};
use crate::message::UserData;
use crate::skin::{Skin, StyleOverrides};
use bitflags::bitflags;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::fmt;
use std::rc::Rc;

slotmap::new_key_type! {
    /// Stable handle to an element in the arena. Stale handles never alias a
    /// newer element.
    pub struct ElementId;
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ElementFlags: u32 {
        /// Not part of the parent's layout; resolved without parent padding.
        const BACKGROUND = 1 << 0;
        /// Exempt from ancestor clipping.
        const NOCLIP = 1 << 1;
        /// Exempt from hit testing.
        const IGNORE = 1 << 2;
        const HIDDEN = 1 << 3;
        const SNAPX = 1 << 4;
        const SNAPY = 1 << 5;
        const EXPANDX = 1 << 6;
        const EXPANDY = 1 << 7;
        /// Controls refuse focus while set.
        const DISABLE = 1 << 8;
        /// Scratch copies of skin layers carry this to skip pointer bookkeeping.
        const SILENT = 1 << 9;

        const EXPAND = Self::EXPANDX.bits() | Self::EXPANDY.bits();
        const SNAP = Self::SNAPX.bits() | Self::SNAPY.bits();
    }
}

/// A node in the tree. Owned by the root's arena; the parent only holds
/// ordering links into it.
pub struct Element {
    pub geometry: Geometry,
    pub flags: ElementFlags,
    pub parent: Option<ElementId>,
    pub name: Option<SmolStr>,
    pub skin: Option<Rc<Skin>>,
    /// `None` inherits the parent's style.
    pub style: Option<u32>,
    pub(crate) kind: SmolStr,
    pub(crate) behavior: Rc<dyn Behavior>,
    pub(crate) links: [Link; 3],
    pub(crate) children: [Span; 3],
    pub(crate) user_data: Option<UserData>,
    pub(crate) user_table: FxHashMap<SmolStr, UserData>,
    /// Overrides supplied by a layout, merged on top of the skin's.
    pub(crate) layout_style: StyleOverrides,
    /// Rebuilt on every skin change.
    pub(crate) skin_style: StyleOverrides,
}

impl Element {
    pub(crate) fn new(
        kind: SmolStr,
        behavior: Rc<dyn Behavior>,
        name: Option<SmolStr>,
        flags: ElementFlags,
        transform: Transform,
    ) -> Self {
        Self {
            geometry: Geometry::new(transform),
            flags,
            parent: None,
            name,
            skin: None,
            style: None,
            kind,
            behavior,
            links: Default::default(),
            children: Default::default(),
            user_data: None,
            user_table: FxHashMap::default(),
            layout_style: StyleOverrides::default(),
            skin_style: StyleOverrides::default(),
        }
    }

    /// Registered kind name this element was created from.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.contains(ElementFlags::HIDDEN)
    }

    pub fn first_child(&self, order: ChildOrder) -> Option<ElementId> {
        self.children[order.index()].first
    }

    pub fn last_child(&self, order: ChildOrder) -> Option<ElementId> {
        self.children[order.index()].last
    }

    pub fn next_sibling(&self, order: ChildOrder) -> Option<ElementId> {
        self.links[order.index()].next
    }

    pub fn prev_sibling(&self, order: ChildOrder) -> Option<ElementId> {
        self.links[order.index()].prev
    }

    pub fn layout_style(&self) -> &StyleOverrides {
        &self.layout_style
    }

    pub fn layout_style_mut(&mut self) -> &mut StyleOverrides {
        &mut self.layout_style
    }

    pub fn skin_style(&self) -> &StyleOverrides {
        &self.skin_style
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("parent", &self.parent)
            .field("geometry", &self.geometry)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}
