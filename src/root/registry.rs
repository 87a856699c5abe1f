use crate::behavior::Behavior;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::fmt;
use std::rc::Rc;

/// Produces the behavior for a newly created element.
pub type Factory = Rc<dyn Fn() -> Rc<dyn Behavior>>;

/// Element kinds by name. Names are case-insensitive.
#[derive(Default)]
pub struct FactoryRegistry {
    factories: FxHashMap<SmolStr, Factory>,
}

impl FactoryRegistry {
    /// Registers `kind`, replacing any previous factory. Returns `true` if
    /// the kind was new.
    pub fn register(
        &mut self,
        kind: &str,
        factory: impl Fn() -> Rc<dyn Behavior> + 'static,
    ) -> bool {
        tracing::debug!(kind, "element kind registered");
        self.factories
            .insert(normalize(kind), Rc::new(factory))
            .is_none()
    }

    pub fn unregister(&mut self, kind: &str) -> bool {
        self.factories.remove(&normalize(kind)).is_some()
    }

    pub fn get(&self, kind: &str) -> Option<Factory> {
        self.factories.get(&normalize(kind)).cloned()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(&normalize(kind))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(SmolStr::as_str)
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

fn normalize(kind: &str) -> SmolStr {
    if kind.bytes().any(|b| b.is_ascii_uppercase()) {
        SmolStr::new(kind.to_ascii_lowercase())
    } else {
        SmolStr::new(kind)
    }
}
