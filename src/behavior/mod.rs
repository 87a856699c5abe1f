mod control;
mod element;
mod layout;
mod style;

pub use control::*;
pub use element::*;
pub use layout::*;

use crate::element::ElementId;
use crate::message::{Message, Reply};
use crate::root::Root;
use std::fmt;
use std::rc::Rc;

/// Message receiver attached to every element.
///
/// Derived behaviors handle the messages they care about and forward the
/// rest to a base behavior explicitly, usually by calling one of
/// [`element_message`] or [`control_message`].
pub trait Behavior {
    fn message(&self, root: &mut Root, id: ElementId, msg: &Message) -> Reply;

    /// Tears the element down. Overrides must end by calling
    /// [`element_destroy`].
    fn destroy(&self, root: &mut Root, id: ElementId) {
        element_destroy(root, id);
    }
}

/// The plain `element` kind.
#[derive(Clone, Copy, Debug, Default)]
pub struct ElementBehavior;

impl Behavior for ElementBehavior {
    fn message(&self, root: &mut Root, id: ElementId, msg: &Message) -> Reply {
        element_message(root, id, msg)
    }
}

/// The `control` kind: an element that takes focus and tracks hover.
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlBehavior;

impl Behavior for ControlBehavior {
    fn message(&self, root: &mut Root, id: ElementId, msg: &Message) -> Reply {
        control_message(root, id, msg)
    }
}

type Intercept = dyn Fn(&dyn Behavior, &mut Root, ElementId, &Message) -> Reply;

/// Wraps a base behavior with a closure that sees every message first. The
/// closure receives the base and decides whether, and when, to forward.
pub struct Delegate {
    base: Rc<dyn Behavior>,
    intercept: Box<Intercept>,
}

impl Delegate {
    pub fn new(
        base: Rc<dyn Behavior>,
        intercept: impl Fn(&dyn Behavior, &mut Root, ElementId, &Message) -> Reply + 'static,
    ) -> Self {
        Self {
            base,
            intercept: Box::new(intercept),
        }
    }
}

impl Behavior for Delegate {
    fn message(&self, root: &mut Root, id: ElementId, msg: &Message) -> Reply {
        (self.intercept)(self.base.as_ref(), root, id, msg)
    }

    fn destroy(&self, root: &mut Root, id: ElementId) {
        self.base.destroy(root, id);
    }
}

impl fmt::Debug for Delegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate").finish_non_exhaustive()
    }
}
