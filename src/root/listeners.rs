use super::Root;
use crate::element::ElementId;
use crate::message::{Message, MsgCode};
use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;

/// Callback run after an element has handled a message.
pub type Listener = Rc<dyn Fn(&mut Root, ElementId, &Message)>;

/// One listener per (element, message code).
#[derive(Default)]
pub struct Listeners {
    map: FxHashMap<(ElementId, MsgCode), Listener>,
}

impl Listeners {
    pub fn insert(&mut self, id: ElementId, code: MsgCode, listener: Listener) -> Option<Listener> {
        self.map.insert((id, code), listener)
    }

    pub fn remove(&mut self, id: ElementId, code: MsgCode) -> Option<Listener> {
        self.map.remove(&(id, code))
    }

    pub fn get(&self, id: ElementId, code: MsgCode) -> Option<Listener> {
        if self.map.is_empty() {
            return None;
        }
        self.map.get(&(id, code)).cloned()
    }

    pub fn remove_element(&mut self, id: ElementId) {
        self.map.retain(|&(element, _), _| element != id);
    }

    pub fn contains_element(&self, id: ElementId) -> bool {
        self.map.keys().any(|&(element, _)| element == id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.map.keys()).finish()
    }
}

impl Root {
    /// Registers `listener` to run after `id` handles any `code` message,
    /// replacing a previous listener for the same pair.
    pub fn add_listener(
        &mut self,
        id: ElementId,
        code: MsgCode,
        listener: impl Fn(&mut Root, ElementId, &Message) + 'static,
    ) {
        self.listeners.insert(id, code, Rc::new(listener));
    }

    pub fn remove_listener(&mut self, id: ElementId, code: MsgCode) -> bool {
        self.listeners.remove(id, code).is_some()
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::CRect;
    use crate::message::{Message, MsgCode};
    use crate::root::{ElementDesc, Root, RootConfig};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn listeners_run_after_the_handler_and_die_with_the_element() {
        let mut root = Root::headless(RootConfig::default());
        let top = root.id();
        let panel = root
            .create(Some(top), ElementDesc::new("element").area(CRect::fill()))
            .expect("panel");
        let seen = Rc::new(Cell::new(None));
        let sink = seen.clone();
        root.add_listener(panel, MsgCode::SetName, move |root, id, _| {
            // the handler has already stored the name
            let name = root.send(id, &Message::GetName).name();
            sink.set(name.map(|n| n.len()));
        });

        root.send(panel, &Message::SetName(Some("panel".into())));
        assert_eq!(seen.get(), Some(5));

        root.destroy(panel);
        assert!(root.listeners().is_empty());
        assert!(!root.remove_listener(panel, MsgCode::SetName));
    }
}
