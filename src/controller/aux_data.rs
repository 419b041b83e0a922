//! Unversioned data shared by the programs of one run
//!
//! Counters, worklists and similar bookkeeping that must survive from one step
//! to the next without being part of the recorded state. Values are keyed by
//! string; collaborators should prefix their keys with their own name.

use rustc_hash::FxHashMap;
use std::any::Any;

#[derive(Default)]
pub struct AuxData {
    values: FxHashMap<String, Box<dyn Any>>,
}

impl AuxData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Any>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// Value under `key`, if present and of type `T`
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref()
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key)?.downcast_mut()
    }

    /// Value under `key`, inserting `init()` first when it is absent.
    /// A value of another type stored under the same key is replaced.
    pub fn get_or_insert_with<T: Any>(&mut self, key: &str, init: impl FnOnce() -> T) -> &mut T {
        if !self.values.get(key).is_some_and(|value| value.is::<T>()) {
            self.values.insert(key.to_string(), Box::new(init()));
        }
        match self.values.get_mut(key).and_then(|value| value.downcast_mut()) {
            Some(value) => value,
            None => unreachable!("slot was just set to the requested type"),
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for AuxData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("AuxData").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_access() {
        let mut data = AuxData::new();
        data.insert("counter", 3usize);
        assert_eq!(data.get::<usize>("counter"), Some(&3));
        assert_eq!(data.get::<String>("counter"), None);

        *data.get_mut::<usize>("counter").unwrap() += 1;
        assert_eq!(data.get::<usize>("counter"), Some(&4));
    }

    #[test]
    fn test_get_or_insert_with() {
        let mut data = AuxData::new();
        data.get_or_insert_with("seen", Vec::<String>::new)
            .push("A".into());
        assert_eq!(data.get::<Vec<String>>("seen").unwrap().len(), 1);

        // mismatched type under the same key is replaced
        assert_eq!(*data.get_or_insert_with("seen", || 7u32), 7);
        assert!(data.remove("seen"));
        assert!(data.is_empty());
    }
}
