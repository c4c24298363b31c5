// ── Run-scoped keyed collection ──
//
// Exact-match lookup over entities reachable by several keys (e.g. a
// controller by name and by serial). Built once, read-only afterwards.

use std::collections::HashMap;

/// Entities stored once, addressable by any of their keys.
#[derive(Debug, Clone)]
pub(crate) struct KeyedCollection<T> {
    /// Primary storage in insertion order.
    entities: Vec<T>,

    /// Key string -> position in `entities`.
    by_key: HashMap<String, usize>,
}

impl<T> Default for KeyedCollection<T> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            by_key: HashMap::new(),
        }
    }
}

impl<T> KeyedCollection<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Store `entity` under every non-empty key. A key that is already
    /// taken keeps its first entity. Returns the number of keys claimed;
    /// the entity is dropped when it claims none.
    pub(crate) fn insert<I, K>(&mut self, keys: I, entity: T) -> usize
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let position = self.entities.len();
        let mut claimed = 0;
        for key in keys {
            let key = key.into();
            if key.is_empty() || self.by_key.contains_key(&key) {
                continue;
            }
            self.by_key.insert(key, position);
            claimed += 1;
        }
        if claimed > 0 {
            self.entities.push(entity);
        }
        claimed
    }

    pub(crate) fn get(&self, key: &str) -> Option<&T> {
        self.by_key.get(key).and_then(|&i| self.entities.get(i))
    }

    /// Number of distinct entities.
    pub(crate) fn len(&self) -> usize {
        self.entities.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
