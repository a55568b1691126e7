//! Identity map from row id to the single live instance for that row.
//!
//! # Invariants
//! - At most one entry per id.
//! - Entries are never evicted; only explicit `remove` drops them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared, mutable handle to a cached entity.
pub type Shared<T> = Rc<RefCell<T>>;

#[derive(Debug)]
pub struct IdentityMap<T> {
    entries: HashMap<i64, Shared<T>>,
}

impl<T> Default for IdentityMap<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> IdentityMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new handle to the cached instance for `id`.
    pub fn get(&self, id: i64) -> Option<Shared<T>> {
        self.entries.get(&id).map(Rc::clone)
    }

    /// Makes `instance` the live entry for `id`, replacing any previous one.
    pub fn register(&mut self, id: i64, instance: Shared<T>) {
        self.entries.insert(id, instance);
    }

    pub fn remove(&mut self, id: i64) -> Option<Shared<T>> {
        self.entries.remove(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::IdentityMap;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn register_replaces_previous_entry() {
        let mut map = IdentityMap::new();
        let first = Rc::new(RefCell::new("first"));
        let second = Rc::new(RefCell::new("second"));

        map.register(1, Rc::clone(&first));
        map.register(1, Rc::clone(&second));

        assert_eq!(map.len(), 1);
        assert!(Rc::ptr_eq(&map.get(1).unwrap(), &second));
    }

    #[test]
    fn remove_missing_id_is_noop() {
        let mut map: IdentityMap<u8> = IdentityMap::new();
        assert!(map.remove(42).is_none());
        assert!(map.is_empty());
    }
}
