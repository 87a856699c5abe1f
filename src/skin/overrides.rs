use crate::message::{Message, MsgCode};
use rustc_hash::FxHashMap;

/// What a stored override applies to: the element itself or one of its
/// skin's layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleTarget {
    Own,
    Layer(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StyleKey {
    pub target: StyleTarget,
    pub code: MsgCode,
    pub subtype: u16,
}

impl StyleKey {
    pub fn of(target: StyleTarget, message: &Message) -> Self {
        Self {
            target,
            code: message.code(),
            subtype: message.subtype(),
        }
    }
}

/// Insertion-ordered set of stored messages, one per [`StyleKey`]. A later
/// message with the same key replaces the earlier one in place.
#[derive(Clone, Debug, Default)]
pub struct StyleOverrides {
    entries: Vec<(StyleKey, Message)>,
    index: FxHashMap<StyleKey, usize>,
}

impl StyleOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `message`, returning `true` if the key was not present before.
    pub fn insert(&mut self, target: StyleTarget, message: Message) -> bool {
        let key = StyleKey::of(target, &message);
        match self.index.get(&key) {
            Some(&slot) => {
                self.entries[slot].1 = message;
                false
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push((key, message));
                true
            }
        }
    }

    pub fn get(&self, key: &StyleKey) -> Option<&Message> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn remove(&mut self, key: &StyleKey) -> Option<Message> {
        let slot = self.index.remove(key)?;
        let (_, message) = self.entries.remove(slot);
        for (key, _) in &self.entries[slot..] {
            if let Some(i) = self.index.get_mut(key) {
                *i -= 1;
            }
        }
        Some(message)
    }

    /// Copies every entry of `other` into `self` with overwrite semantics.
    pub fn merge(&mut self, other: &StyleOverrides) {
        for (key, message) in &other.entries {
            self.insert(key.target, message.clone());
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StyleKey, &Message)> {
        self.entries.iter().map(|(key, message)| (key, message))
    }

    /// Messages stored for `target`, in insertion order.
    pub fn for_target(&self, target: StyleTarget) -> impl Iterator<Item = &Message> {
        self.entries
            .iter()
            .filter(move |(key, _)| key.target == target)
            .map(|(_, message)| message)
    }
}
