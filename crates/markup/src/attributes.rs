//! Ordered attribute maps and their structural diff.
//!
//! Insertion order is preserved (it is the order attributes appear in markup); equality is
//! order-insensitive, so reordering attributes in a template is not a change.

use indexmap::IndexMap;
use indexmap::map::{IntoIter, Iter};

/// Value recorded in a diff for an attribute that was removed.
pub const REMOVED: &str = "";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: IndexMap<String, String>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `name`, keeping its original position when overwriting.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.entries.iter()
    }

    /// Names whose value differs between `self` and `next`.
    ///
    /// Added and changed names carry their value in `next`, in `next` order. Names missing
    /// from `next` follow, carrying the [`REMOVED`] tombstone. An empty result means the two
    /// maps are equal.
    pub fn diff(&self, next: &AttributeMap) -> AttributeMap {
        let mut changed = AttributeMap::new();
        for (name, value) in next.iter() {
            if self.get(name) != Some(value.as_str()) {
                changed.insert(name.clone(), value.clone());
            }
        }
        for name in self.entries.keys() {
            if !next.contains(name) {
                changed.insert(name.clone(), REMOVED);
            }
        }
        changed
    }

    /// Apply a diff produced by [`AttributeMap::diff`] onto `self`.
    ///
    /// `next` is the map the diff was computed against. The diff alone cannot distinguish a
    /// removal from an attribute explicitly set to `""`; names missing from `next` are dropped.
    pub fn apply_diff(&mut self, diff: &AttributeMap, next: &AttributeMap) {
        for (name, value) in diff.iter() {
            if next.contains(name) {
                self.insert(name.clone(), value.clone());
            } else {
                self.remove(name);
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AttributeMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl IntoIterator for AttributeMap {
    type Item = (String, String);
    type IntoIter = IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a AttributeMap {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
