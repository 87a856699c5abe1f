mod actions;
mod behavior;
mod config;
mod ids;
mod input;
mod listeners;
mod registry;

pub use actions::*;
pub use behavior::*;
pub use config::*;
pub use ids::*;
pub use input::*;
pub use listeners::*;
pub use registry::*;

use crate::behavior::{ControlBehavior, ElementBehavior};
use crate::element::{ChildOrder, Element, ElementFlags, ElementId, ElementTree};
use crate::error::TreeError;
use crate::geometry::{CRect, Transform};
use crate::input::MouseState;
use crate::message::{Cursor, DrawArgs, DrawAux, Message, MouseEvent, Reply, StyleChange};
use crate::render::{Backend, HeadlessBackend};
use crate::skin::{Skin, StyleNames, StyleOverrides};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::fmt;
use std::rc::Rc;

/// What to create: kind name plus initial state.
#[derive(Clone, Debug)]
pub struct ElementDesc {
    pub kind: SmolStr,
    pub name: Option<SmolStr>,
    pub flags: ElementFlags,
    pub transform: Transform,
    /// Sibling to insert before; `None` appends.
    pub next: Option<ElementId>,
}

impl ElementDesc {
    pub fn new(kind: impl Into<SmolStr>) -> Self {
        Self {
            kind: kind.into(),
            name: None,
            flags: ElementFlags::empty(),
            transform: Transform::default(),
            next: None,
        }
    }

    pub fn name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn flags(mut self, flags: ElementFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn area(mut self, area: CRect) -> Self {
        self.transform.area = area;
        self
    }

    pub fn before(mut self, next: ElementId) -> Self {
        self.next = Some(next);
        self
    }
}

/// Owner of the element tree and of everything that is global to it: the
/// backend, focus, hover, capture, the topmost element, drag state, the
/// clock and the registries.
///
/// The root is itself an element (see [`Root::id`]) whose area is the
/// window.
pub struct Root {
    pub(crate) tree: ElementTree,
    pub(crate) backend: Box<dyn Backend>,
    id: ElementId,
    pub(crate) config: RootConfig,
    pub(crate) focus: Option<ElementId>,
    pub(crate) hover: Option<ElementId>,
    pub(crate) capture: Option<ElementId>,
    pub(crate) topmost: Option<ElementId>,
    pub(crate) drag: Option<Drag>,
    pub(crate) mouse: MouseState,
    keys: [u32; 8],
    cursor: Option<Cursor>,
    cursor_map: FxHashMap<Cursor, Vec<u8>>,
    time: f64,
    actions: ActionQueue,
    registry: FactoryRegistry,
    pub(crate) ids: IdMap,
    listeners: Listeners,
    pub(crate) style_names: StyleNames,
}

impl Root {
    pub fn new(config: RootConfig, backend: Box<dyn Backend>) -> Self {
        let mut registry = FactoryRegistry::default();
        registry.register("element", || Rc::new(ElementBehavior));
        registry.register("control", || Rc::new(ControlBehavior));

        let area = config.area;
        let mut element = Element::new(
            SmolStr::new_static("root"),
            Rc::new(RootBehavior),
            None,
            ElementFlags::empty(),
            Transform::new(CRect::from_abs(area.left, area.top, area.right, area.bottom)),
        );
        element.style = Some(0);
        let mut tree = ElementTree::default();
        let id = tree.insert(element);

        let mut root = Self {
            tree,
            backend,
            id,
            config,
            focus: None,
            hover: None,
            capture: None,
            topmost: None,
            drag: None,
            mouse: MouseState::default(),
            keys: [0; 8],
            cursor: None,
            cursor_map: FxHashMap::default(),
            time: 0.0,
            actions: ActionQueue::default(),
            registry,
            ids: IdMap::default(),
            listeners: Listeners::default(),
            style_names: StyleNames::default(),
        };
        root.send(id, &Message::Construct);
        tracing::debug!(?id, "root created");
        root
    }

    /// Root backed by a [`HeadlessBackend`].
    pub fn headless(config: RootConfig) -> Self {
        Self::new(config, Box::new(HeadlessBackend::new()))
    }

    /// The root element.
    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn config(&self) -> &RootConfig {
        &self.config
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn Backend {
        self.backend.as_mut()
    }

    pub fn backend_as<T: Backend>(&self) -> Option<&T> {
        self.backend.as_any().downcast_ref()
    }

    pub fn backend_as_mut<T: Backend>(&mut self) -> Option<&mut T> {
        self.backend.as_any_mut().downcast_mut()
    }

    pub fn registry(&self) -> &FactoryRegistry {
        &self.registry
    }

    /// Registers an element kind; see [`FactoryRegistry::register`].
    pub fn register(
        &mut self,
        kind: &str,
        factory: impl Fn() -> Rc<dyn crate::behavior::Behavior> + 'static,
    ) -> bool {
        self.registry.register(kind, factory)
    }

    pub fn style_names(&self) -> &StyleNames {
        &self.style_names
    }

    pub fn style_names_mut(&mut self) -> &mut StyleNames {
        &mut self.style_names
    }

    /// Delivers `msg` to `id`'s behavior, then to a listener registered for
    /// the pair. Messages to missing elements are rejected.
    pub fn send(&mut self, id: ElementId, msg: &Message) -> Reply {
        let Some(behavior) = self.tree.get(id).map(|e| e.behavior.clone()) else {
            return Reply::Rejected;
        };
        let reply = behavior.message(self, id, msg);
        if let Some(listener) = self.listeners.get(id, msg.code()) {
            listener(self, id, msg);
        }
        reply
    }

    /// Creates an element of a registered kind and attaches it under
    /// `parent`.
    pub fn create(
        &mut self,
        parent: Option<ElementId>,
        desc: ElementDesc,
    ) -> Result<ElementId, TreeError> {
        let Some(factory) = self.registry.get(&desc.kind) else {
            tracing::warn!(kind = %desc.kind, "unknown element kind");
            return Err(TreeError::UnknownKind(desc.kind));
        };
        for required in [parent, desc.next].into_iter().flatten() {
            if !self.tree.contains(required) {
                return Err(TreeError::MissingElement(required));
            }
        }
        if let Some(next) = desc.next
            && (parent.is_none() || self.tree.parent(next) != parent)
        {
            return Err(TreeError::ForeignSibling { next, parent });
        }

        let kind = desc.kind.clone();
        let id = self.tree.insert(Element::new(
            desc.kind,
            factory(),
            desc.name,
            desc.flags,
            desc.transform,
        ));
        tracing::debug!(%kind, ?id, "element created");
        self.send(id, &Message::Construct);
        if parent.is_some() {
            let reply = self.send(
                id,
                &Message::SetParent {
                    parent,
                    next: desc.next,
                },
            );
            if !reply.is_accepted() || self.tree.parent(id) != parent {
                tracing::warn!(?id, ?parent, "new element refused its parent");
                self.destroy(id);
                return Err(TreeError::ParentRejected(id));
            }
        }
        Ok(id)
    }

    /// Destroys `id` and its subtree. The root element itself is destroyed
    /// only by dropping the root.
    pub fn destroy(&mut self, id: ElementId) {
        if id == self.id {
            tracing::warn!("refusing to destroy the root element");
            return;
        }
        let Some(behavior) = self.tree.get(id).map(|e| e.behavior.clone()) else {
            return;
        };
        behavior.destroy(self, id);
    }

    pub fn focus(&self) -> Option<ElementId> {
        self.focus
    }

    /// Asks `id` to take focus; returns whether it did.
    pub fn set_focus(&mut self, id: ElementId) -> bool {
        self.send(id, &Message::GotFocus).is_accepted() && self.focus == Some(id)
    }

    pub fn clear_focus(&mut self) {
        if let Some(focus) = self.focus {
            self.send(focus, &Message::LostFocus);
        }
        self.focus = None;
    }

    pub fn hover(&self) -> Option<ElementId> {
        self.hover
    }

    pub fn capture(&self) -> Option<ElementId> {
        self.capture
    }

    /// Routes all pointer input to `id` first, wherever the pointer is.
    pub fn set_capture(&mut self, id: Option<ElementId>) {
        self.capture = id.filter(|&id| self.tree.contains(id));
    }

    pub fn topmost(&self) -> Option<ElementId> {
        self.topmost
    }

    /// Draws `id` above everything and hit-tests it before the tree.
    pub fn set_topmost(&mut self, id: Option<ElementId>) {
        if let Some(old) = self.topmost {
            self.dirty(old);
        }
        self.topmost = id.filter(|&id| self.tree.contains(id));
        if let Some(new) = self.topmost {
            self.dirty(new);
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn mouse(&self) -> &MouseState {
        &self.mouse
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    /// Stores platform data handed to the backend whenever `cursor` is set.
    pub fn register_cursor(&mut self, cursor: Cursor, data: Vec<u8>) {
        self.cursor_map.insert(cursor, data);
    }

    pub fn is_key_down(&self, code: u8) -> bool {
        self.keys[usize::from(code / 32)] & (1 << (code % 32)) != 0
    }

    fn set_key(&mut self, code: u8, down: bool) {
        let word = &mut self.keys[usize::from(code / 32)];
        if down {
            *word |= 1 << (code % 32);
        } else {
            *word &= !(1 << (code % 32));
        }
    }

    /// Maps a string id to `element`.
    pub fn add_id(&mut self, name: &str, element: ElementId) {
        self.ids.insert(name, element);
    }

    pub fn remove_id(&mut self, name: &str) -> Option<ElementId> {
        self.ids.remove(name)
    }

    pub fn element_by_id(&self, name: &str) -> Option<ElementId> {
        self.ids.get(name)
    }

    pub fn ids(&self) -> &IdMap {
        &self.ids
    }

    /// Layout-supplied overrides of `id`, merged over its skin's on the next
    /// skin change.
    pub fn layout_style_mut(&mut self, id: ElementId) -> Option<&mut StyleOverrides> {
        self.tree.get_mut(id).map(|e| e.layout_style_mut())
    }

    pub fn set_area(&mut self, id: ElementId, area: CRect) -> Reply {
        self.send(id, &Message::SetArea(area))
    }

    pub fn set_flag(&mut self, id: ElementId, flag: ElementFlags, on: bool) -> Reply {
        self.send(id, &Message::SetFlag(flag, on))
    }

    pub fn set_parent(
        &mut self,
        id: ElementId,
        parent: Option<ElementId>,
        next: Option<ElementId>,
    ) -> Reply {
        self.send(id, &Message::SetParent { parent, next })
    }

    pub fn set_skin(&mut self, id: ElementId, skin: Option<Rc<Skin>>) -> Reply {
        self.send(id, &Message::SetSkin(skin))
    }

    pub fn set_style(&mut self, id: ElementId, change: StyleChange) -> Reply {
        self.send(id, &Message::SetStyle(change))
    }

    /// Draws the whole tree through the backend.
    pub fn draw(&mut self) {
        let id = self.id;
        let args = DrawArgs {
            area: self.tree.resolve_rect(id),
            aux: DrawAux {
                dpi: self.config.dpi,
                ..DrawAux::default()
            },
            culled: false,
        };
        self.send(id, &Message::Draw(args));
    }

    pub fn process_messages(&mut self) -> bool {
        self.backend.process_messages()
    }

    pub fn load_extension(&mut self, name: &str) -> bool {
        self.backend.load_extension(name)
    }

    /// Destroys every element below the root and shuts the backend down.
    pub fn terminate(&mut self) {
        let id = self.id;
        while let Some(child) = self.tree.get(id).and_then(|e| e.first_child(ChildOrder::All)) {
            self.destroy(child);
            if self.tree.contains(child) {
                break;
            }
        }
        self.backend.terminate();
    }

    pub(crate) fn dirty(&mut self, id: ElementId) {
        self.backend.dirty_element(id);
    }

    /// Dirty plus pointer check; called before and after a geometry change.
    pub(crate) fn invalidate(&mut self, id: ElementId) {
        self.mouse_move_check(id);
        self.dirty(id);
    }

    /// Schedules a synthetic mouse move if the pointer is over `id`.
    pub(crate) fn mouse_move_check(&mut self, id: ElementId) {
        let Some(element) = self.tree.get(id) else {
            return;
        };
        if element.parent.is_none()
            || element
                .flags
                .intersects(ElementFlags::IGNORE | ElementFlags::SILENT)
        {
            return;
        }
        let position = self.mouse.position;
        if self.tree.hit(id, position.x, position.y) {
            self.mouse.pending_move = true;
        }
    }

    /// Injects the pending synthetic mouse move, if any.
    pub(crate) fn flush_mouse_move(&mut self) {
        if !self.mouse.pending_move {
            return;
        }
        self.mouse.pending_move = false;
        let position = self.mouse.position;
        let event = MouseEvent {
            buttons: self.mouse.buttons,
            ..MouseEvent::at(position.x, position.y)
        };
        self.inject(Message::MouseMove(event));
    }

    /// Links `id` into its parent's orderings before `next`.
    pub(crate) fn attach(&mut self, id: ElementId, next: Option<ElementId>) {
        self.tree.link(id, next);
        self.mouse_move_check(id);
    }

    /// Unlinks `id` from its parent's orderings; the parent stays set.
    pub(crate) fn detach(&mut self, id: ElementId) {
        self.mouse_move_check(id);
        self.tree.unlink(id);
    }

    /// Clears every root-level reference to `id`.
    pub(crate) fn release(&mut self, id: ElementId) {
        for slot in [
            &mut self.focus,
            &mut self.hover,
            &mut self.capture,
            &mut self.topmost,
        ] {
            if *slot == Some(id) {
                *slot = None;
            }
        }
        if let Some(drag) = &mut self.drag
            && drag.draw == Some(id)
        {
            drag.draw = None;
        }
        self.listeners.remove_element(id);
    }

    pub(crate) fn references(&self, id: ElementId) -> bool {
        [self.focus, self.hover, self.capture, self.topmost].contains(&Some(id))
            || self.drag.as_ref().is_some_and(|d| d.draw == Some(id))
            || self.listeners.contains_element(id)
    }
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Root")
            .field("id", &self.id)
            .field("elements", &self.tree.len())
            .field("focus", &self.focus)
            .field("hover", &self.hover)
            .field("capture", &self.capture)
            .field("topmost", &self.topmost)
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{ElementDesc, Root, RootConfig};
    use crate::element::ChildOrder;
    use crate::error::TreeError;
    use crate::geometry::CRect;
    use crate::message::{Message, MsgCode};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn unknown_kinds_fail_without_side_effects() {
        let mut root = Root::headless(RootConfig::default());
        let top = root.id();
        let before = root.tree().len();
        let err = root
            .create(Some(top), ElementDesc::new("listbox"))
            .expect_err("unregistered kind");
        assert_eq!(err, TreeError::UnknownKind("listbox".into()));
        assert_eq!(root.tree().len(), before);
    }

    #[test]
    fn construct_runs_before_set_parent() {
        let mut root = Root::headless(RootConfig::default());
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        root.register("Logged", move || {
            let sink = sink.clone();
            Rc::new(crate::behavior::Delegate::new(
                Rc::new(crate::behavior::ElementBehavior),
                move |base, root, id, msg| {
                    if matches!(msg.code(), MsgCode::Construct | MsgCode::SetParent) {
                        sink.borrow_mut().push(msg.code());
                    }
                    base.message(root, id, msg)
                },
            ))
        });
        let top = root.id();
        let id = root.create(Some(top), ElementDesc::new("logged")).expect("logged");
        assert_eq!(*log.borrow(), vec![MsgCode::Construct, MsgCode::SetParent]);
        assert_eq!(root.tree().get(id).map(|e| e.kind()), Some("logged"));
    }

    #[test]
    fn destroying_an_element_removes_its_subtree_and_id() {
        let mut root = Root::headless(RootConfig::default());
        let top = root.id();
        let panel = root
            .create(Some(top), ElementDesc::new("element").area(CRect::fill()))
            .expect("panel");
        let child = root
            .create(Some(panel), ElementDesc::new("control"))
            .expect("child");
        root.add_id("child", child);
        root.set_capture(Some(child));
        root.set_topmost(Some(child));

        root.destroy(panel);
        assert!(!root.tree().contains(panel));
        assert!(!root.tree().contains(child));
        assert_eq!(root.element_by_id("child"), None);
        assert_eq!(root.capture(), None);
        assert_eq!(root.topmost(), None);
        assert_eq!(root.tree().children(top, ChildOrder::All).count(), 0);
        assert_eq!(root.tree().len(), 1);
    }

    #[test]
    fn key_state_tracks_down_and_up() {
        let mut root = Root::headless(RootConfig::default());
        root.inject(Message::KeyDown(crate::message::KeyEvent::key(200)));
        assert!(root.is_key_down(200));
        assert!(!root.is_key_down(201));
        root.inject(Message::KeyUp(crate::message::KeyEvent::key(200)));
        assert!(!root.is_key_down(200));
    }

    #[test]
    fn terminate_tears_down_the_tree() {
        let mut root = Root::headless(RootConfig::default());
        let top = root.id();
        for _ in 0..3 {
            root.create(Some(top), ElementDesc::new("element")).expect("element");
        }
        root.terminate();
        assert_eq!(root.tree().len(), 1);
        assert!(
            root.backend_as::<crate::render::HeadlessBackend>()
                .expect("headless")
                .terminated
        );
    }
}
