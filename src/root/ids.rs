use crate::element::ElementId;
use rustc_hash::FxHashMap;
use slotmap::SecondaryMap;
use smol_str::SmolStr;

/// Bijection between string ids and elements.
#[derive(Debug, Default)]
pub struct IdMap {
    by_name: FxHashMap<SmolStr, ElementId>,
    by_element: SecondaryMap<ElementId, SmolStr>,
}

impl IdMap {
    /// Maps `name` to `element`. Any previous mapping of either side is
    /// dropped first.
    pub fn insert(&mut self, name: &str, element: ElementId) {
        if let Some(old) = self.by_name.remove(name) {
            self.by_element.remove(old);
        }
        if let Some(old) = self.by_element.remove(element) {
            self.by_name.remove(&old);
        }
        let name = SmolStr::new(name);
        self.by_name.insert(name.clone(), element);
        self.by_element.insert(element, name);
    }

    pub fn get(&self, name: &str) -> Option<ElementId> {
        self.by_name.get(name).copied()
    }

    pub fn id_of(&self, element: ElementId) -> Option<&str> {
        self.by_element.get(element).map(SmolStr::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<ElementId> {
        let element = self.by_name.remove(name)?;
        self.by_element.remove(element);
        Some(element)
    }

    pub fn remove_element(&mut self, element: ElementId) -> bool {
        match self.by_element.remove(element) {
            Some(name) => {
                self.by_name.remove(&name);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
