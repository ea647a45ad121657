//! Typed, namespaced state shared between rules.
//!
//! Each rule owns the slots it declares through a [`StateKey`]. Another rule
//! may read a slot only by naming the same key, so cross-rule coupling is
//! visible at the key's declaration.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Typed key into a [`StateStore`].
pub struct StateKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StateKey<T> {
    /// Declare a key. Names must be unique across rules.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Namespace of this key.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for StateKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StateKey<T> {}

impl<T> fmt::Debug for StateKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateKey").field(&self.name).finish()
    }
}

/// Heterogeneous map of rule state.
#[derive(Default)]
pub struct StateStore {
    slots: HashMap<&'static str, Box<dyn Any + Send>>,
}

impl StateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value`, replacing any previous value under the same key.
    pub fn insert<T: Any + Send>(&mut self, key: StateKey<T>, value: T) {
        self.slots.insert(key.name, Box::new(value));
    }

    #[must_use]
    pub fn get<T: Any + Send>(&self, key: StateKey<T>) -> Option<&T> {
        self.slots.get(key.name)?.downcast_ref()
    }

    pub fn get_mut<T: Any + Send>(&mut self, key: StateKey<T>) -> Option<&mut T> {
        self.slots.get_mut(key.name)?.downcast_mut()
    }

    /// Mutable access, inserting `T::default()` if the slot is empty.
    pub fn get_or_default<T: Any + Send + Default>(&mut self, key: StateKey<T>) -> &mut T {
        let slot = self
            .slots
            .entry(key.name)
            .or_insert_with(|| Box::new(T::default()));
        if !slot.is::<T>() {
            *slot = Box::new(T::default());
        }
        match slot.downcast_mut() {
            Some(value) => value,
            None => unreachable!("slot type checked above"),
        }
    }

    pub fn remove<T: Any + Send>(&mut self, key: StateKey<T>) -> Option<T> {
        let boxed = self.slots.remove(key.name)?;
        boxed.downcast().ok().map(|value| *value)
    }

    #[must_use]
    pub fn contains<T>(&self, key: StateKey<T>) -> bool {
        self.slots.contains_key(key.name)
    }

    /// Drop every slot.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.slots.keys().collect();
        keys.sort();
        f.debug_struct("StateStore").field("keys", &keys).finish()
    }
}
