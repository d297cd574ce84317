//! Host data attached to a breaking engine.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Shared, type-erased stash value.
pub type StashValue = Rc<dyn Any>;

/// Free-form key/value store living alongside the engine options.
#[derive(Clone, Default)]
pub struct Stash {
    entries: HashMap<String, StashValue>,
}

impl Stash {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<StashValue> {
        self.entries.get(key).cloned()
    }

    /// Value under `key` if it has type `T`.
    #[must_use]
    pub fn get_as<T: 'static>(&self, key: &str) -> Option<Rc<T>> {
        self.get(key).and_then(|v| v.downcast::<T>().ok())
    }

    /// Store `value`, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: StashValue) -> Option<StashValue> {
        self.entries.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<StashValue> {
        self.entries.remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Debug for Stash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
